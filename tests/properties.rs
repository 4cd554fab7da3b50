use googletest::prelude::*;
use wagen::*;

fn all_types(graph: &TypeGraph) -> Vec<HeapType> {
    (0..graph.len())
        .map(|i| HeapType::Idx(TypeIdx(i as u32)))
        .collect()
}

#[gtest]
fn it_builds_valid_graphs_for_many_seeds_and_feature_sets() {
    let feature_sets = [
        FeatureSet::MVP,
        FeatureSet::SIMD | FeatureSet::MULTIVALUE,
        FeatureSet::EXCEPTION_HANDLING,
        FeatureSet::SHARED_EVERYTHING,
        FeatureSet::all(),
    ];
    for seed in 0..64 {
        for features in feature_sets {
            let mut rand = Random::new(seed);
            let n = (seed % 23) as usize;
            let generated = HeapTypeGenerator::create(&mut rand, features, n);
            expect_that!(generated.builder.build(), ok(anything()));
        }
    }
}

#[gtest]
fn it_repairs_every_generated_graph() {
    for seed in 0..32 {
        let mut rand = Random::new(seed);
        let generated = HeapTypeGenerator::create(&mut rand, FeatureSet::all(), 16);
        let graph = generated.builder.build().unwrap();
        let types = all_types(&graph);

        let (repaired, out) = HeapTypeGenerator::make_inhabitable(&graph, &types);
        expect_that!(out, eq(&types));
        expect_that!(
            HeapTypeGenerator::get_inhabitable(&repaired, &types),
            eq(&types)
        );

        let (again, _) = HeapTypeGenerator::make_inhabitable(&repaired, &types);
        expect_that!(again, eq(&repaired));
    }
}

#[gtest]
fn it_repairs_deterministically() {
    for seed in 0..16 {
        let mut rand = Random::new(seed);
        let generated = HeapTypeGenerator::create(&mut rand, FeatureSet::all(), 12);
        let graph = generated.builder.build().unwrap();
        let types = all_types(&graph);

        let (a, _) = HeapTypeGenerator::make_inhabitable(&graph, &types);
        let (b, _) = HeapTypeGenerator::make_inhabitable(&graph, &types);
        expect_that!(a, eq(&b));
    }
}
