use pretty_assertions::{assert_eq, assert_ne};
use wagen::*;

fn build_graph(seed: u64, features: FeatureSet, n: usize) -> TypeGraph {
    let mut rand = Random::new(seed);
    let generated = HeapTypeGenerator::create(&mut rand, features, n);
    generated.builder.build().expect("generated graph should build")
}

#[test]
fn it_generates_an_empty_graph_for_zero_types() {
    let graph = build_graph(0, FeatureSet::all(), 0);
    assert!(graph.is_empty());
    assert!(graph.rec_groups().is_empty());
}

#[test]
fn it_generates_the_requested_number_of_types() {
    let graph = build_graph(0, FeatureSet::all(), 20);
    assert_eq!(graph.len(), 20);
    assert!(!graph.rec_groups().is_empty());
}

#[test]
fn it_is_deterministic_for_a_fixed_seed() {
    for seed in [0, 1, 42, u64::MAX] {
        let a = build_graph(seed, FeatureSet::all(), 25);
        let b = build_graph(seed, FeatureSet::all(), 25);
        assert_eq!(a, b);
    }
}

#[test]
fn it_varies_across_seeds() {
    let a = build_graph(0, FeatureSet::all(), 20);
    let b = build_graph(1, FeatureSet::all(), 20);
    assert_ne!(a, b);
}

#[test]
fn it_scopes_children_to_the_recursion_group() {
    let graph = build_graph(7, FeatureSet::all(), 30);
    for def in &graph.defs {
        for child in def.ref_children().into_iter().flatten() {
            if let HeapType::Idx(idx) = child.heap {
                assert!(idx.0 < def.rec_group_end);
            }
        }
    }
}

#[test]
fn it_partitions_types_into_contiguous_rec_groups() {
    let graph = build_graph(9, FeatureSet::all(), 40);
    let mut covered = 0;
    for (start, end) in graph.rec_groups() {
        assert_eq!(start, covered);
        assert!(end > start);
        for def in &graph.defs[start..end] {
            assert_eq!(def.rec_group_start as usize, start);
            assert_eq!(def.rec_group_end as usize, end);
        }
        covered = end;
    }
    assert_eq!(covered, graph.len());
}

#[test]
fn it_propagates_shareability() {
    for seed in 0..10 {
        let graph = build_graph(seed, FeatureSet::all(), 30);
        for def in &graph.defs {
            if let Some(supertype) = def.supertype {
                assert_eq!(def.share, graph[supertype].share);
            }
            if def.share == Shareability::Shared {
                for child in def.ref_children().into_iter().flatten() {
                    assert_eq!(graph.share_of(child.heap), Shareability::Shared);
                }
            }
        }
    }
}

#[test]
fn it_never_declares_a_final_supertype() {
    for seed in 0..10 {
        let graph = build_graph(seed, FeatureSet::all(), 20);
        for def in &graph.defs {
            if let Some(supertype) = def.supertype {
                assert!(graph[supertype].is_open);
            }
        }
    }
}

#[test]
fn it_keeps_exn_references_nullable() {
    for seed in 0..10 {
        let graph = build_graph(seed, FeatureSet::all(), 25);
        for def in &graph.defs {
            for child in def.ref_children().into_iter().flatten() {
                if child.heap.is_maybe_shared(AbsHeapType::Exn) {
                    assert_eq!(child.null, Nullability::Nullable);
                }
            }
        }
    }
}

#[test]
fn it_records_reflexive_and_direct_subtype_indices() {
    let mut rand = Random::new(5);
    let generated = HeapTypeGenerator::create(&mut rand, FeatureSet::all(), 20);
    let subtype_indices = generated.subtype_indices.clone();
    let graph = generated.builder.build().unwrap();

    for (i, subs) in subtype_indices.iter().enumerate() {
        assert_eq!(subs[0], TypeIdx(i as u32));
    }
    for (i, def) in graph.defs.iter().enumerate() {
        if let Some(supertype) = def.supertype {
            assert!(subtype_indices[supertype.0 as usize].contains(&TypeIdx(i as u32)));
        }
    }
}

#[test]
fn it_avoids_extended_features_when_disabled() {
    let graph = build_graph(3, FeatureSet::MVP, 30);
    for def in &graph.defs {
        assert_eq!(def.share, Shareability::Unshared);
        let values: Vec<ValType> = match &def.comp {
            CompType::Struct(fields) => fields
                .iter()
                .filter_map(|f| match f.1 {
                    StorageType::ValType(v) => Some(v),
                    StorageType::PackType(_) => None,
                })
                .collect(),
            CompType::Array(element) => match element.1 {
                StorageType::ValType(v) => vec![v],
                StorageType::PackType(_) => Vec::new(),
            },
            CompType::Func {
                parameters,
                results,
            } => {
                // Multivalue is off, so at most one result.
                assert!(results.len() <= 1);
                parameters.iter().chain(results).copied().collect()
            }
        };
        for value in values {
            assert_ne!(value, ValType::Vec(VecType::V128));
            if let ValType::Ref(r) = value {
                assert!(!r.heap.is_maybe_shared(AbsHeapType::Exn));
                assert_eq!(graph.share_of(r.heap), Shareability::Unshared);
            }
        }
    }
}
