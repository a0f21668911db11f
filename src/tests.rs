#[cfg(test)]
mod construction_tests {
    use crate::core::errors::LayerSetError;
    use crate::font_source::{Layer, LayerSet, DEFAULT_LAYER_NAME};

    #[test]
    fn test_order_follows_input() {
        let names = ["foreground", "background", "sketches", "public.default"];
        let layers = LayerSet::from_layers(names.iter().map(|name| Layer::new(*name)), None).unwrap();
        assert_eq!(layers.layer_order(), names);
        assert_eq!(layers.default_layer_name(), DEFAULT_LAYER_NAME);
    }

    #[test]
    fn test_empty_input_creates_default_layer() {
        let mut layers = LayerSet::from_layers(Vec::new(), None).unwrap();
        assert_eq!(layers.len(), 1);
        let default = layers.default_layer().unwrap();
        assert_eq!(default.name(), DEFAULT_LAYER_NAME);
        assert!(default.is_default());

        let mut layers = LayerSet::default();
        assert_eq!(layers.layer_order(), vec![DEFAULT_LAYER_NAME]);
        assert!(layers.get(DEFAULT_LAYER_NAME).unwrap().is_default());
    }

    #[test]
    fn test_explicit_default_with_empty_input_fails() {
        let result = LayerSet::from_layers(Vec::new(), Some("foreground"));
        assert!(matches!(result, Err(LayerSetError::Structural(_))));
    }

    #[test]
    fn test_no_resolvable_default_fails() {
        let result = LayerSet::from_layers([Layer::new("foreground"), Layer::new("background")], None);
        assert!(matches!(result, Err(LayerSetError::Structural(_))));
    }

    #[test]
    fn test_default_resolution() {
        // the only layer
        let mut layers = LayerSet::from_layers([Layer::new("foreground")], None).unwrap();
        assert_eq!(layers.default_layer_name(), "foreground");
        assert!(layers.get("foreground").unwrap().is_default());

        // explicit name
        let mut layers = LayerSet::from_layers(
            [Layer::new("foreground"), Layer::new("background")],
            Some("background"),
        )
        .unwrap();
        assert_eq!(layers.default_layer_name(), "background");
        assert!(!layers.get("foreground").unwrap().is_default());

        // flagged layer
        let layers = LayerSet::from_layers(
            [Layer::new("foreground"), Layer::new_default("background")],
            None,
        )
        .unwrap();
        assert_eq!(layers.default_layer_name(), "background");
    }

    #[test]
    fn test_invalid_defaults_fail() {
        let missing = LayerSet::from_layers([Layer::new("foreground")], Some("background"));
        assert!(matches!(missing, Err(LayerSetError::Structural(_))));

        let two_flagged =
            LayerSet::from_layers([Layer::new_default("a"), Layer::new_default("b")], None);
        assert!(matches!(two_flagged, Err(LayerSetError::Structural(_))));

        let conflicting = LayerSet::from_layers(
            [Layer::new_default("a"), Layer::new("b")],
            Some("b"),
        );
        assert!(matches!(conflicting, Err(LayerSetError::Structural(_))));
    }

    #[test]
    fn test_duplicate_names_fail() {
        let result = LayerSet::from_layers([Layer::new("a"), Layer::new("a")], Some("a"));
        assert!(matches!(result, Err(LayerSetError::Structural(_))));
    }

    #[test]
    fn test_serialized_form() {
        let json = serde_json::to_value(LayerSet::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"name": "public.default", "default": true}])
        );

        let layers = LayerSet::from_layers(
            [Layer::new("foreground"), Layer::new("background")],
            Some("foreground"),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&layers).unwrap(),
            serde_json::json!([
                {"name": "foreground", "default": true},
                {"name": "background"}
            ])
        );
        assert_eq!(
            format!("{layers:?}"),
            "<LayerSet (2 layers, default 'foreground')>"
        );
    }
}

#[cfg(test)]
mod lazy_loading_tests {
    use crate::core::errors::LayerSetError;
    use crate::data::{shared, MemoryStore, StoreCall};
    use crate::font_source::{Glyph, LayerSet};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample_store() -> Rc<RefCell<MemoryStore>> {
        shared(
            MemoryStore::new("foreground")
                .with_layer("foreground", [Glyph::new("a"), Glyph::new("b")])
                .with_layer("background", [Glyph::new("a")])
                .with_layer("sketches", [Glyph::new("c")]),
        )
    }

    #[test]
    fn test_lazy_read_loads_only_default() {
        let store = sample_store();
        let layers = LayerSet::read(store.clone(), true).unwrap();
        assert_eq!(layers.layer_order(), vec!["foreground", "background", "sketches"]);
        assert!(layers.is_loaded("foreground"));
        assert!(!layers.is_loaded("background"));
        assert!(!layers.is_loaded("sketches"));
        assert!(layers.has_store());
        assert_eq!(
            store.borrow().calls(),
            vec![StoreCall::Read("foreground".to_string())]
        );
    }

    #[test]
    fn test_eager_read_loads_everything() {
        let store = sample_store();
        let layers = LayerSet::read(store.clone(), false).unwrap();
        assert!(layers.is_loaded("background"));
        assert!(layers.is_loaded("sketches"));
        assert!(!layers.has_store());
        assert_eq!(store.borrow().calls().len(), 3);
    }

    #[test]
    fn test_get_memoizes_loads() {
        let store = sample_store();
        let mut layers = LayerSet::read(store.clone(), true).unwrap();

        let first = layers.get("background").unwrap().clone();
        for _ in 0..5 {
            assert_eq!(layers.get("background").unwrap(), &first);
        }
        assert_eq!(store.borrow().read_count("background"), 1);
        assert!(!first.is_default());
        assert!(first.contains("a"));
    }

    #[test]
    fn test_get_unknown_layer() {
        let mut layers = LayerSet::read(sample_store(), true).unwrap();
        assert!(matches!(
            layers.get("nope"),
            Err(LayerSetError::Lookup { kind: "Layer", .. })
        ));
        assert!(layers.get_opt("nope").unwrap().is_none());
        assert!(layers.get_opt("sketches").unwrap().is_some());
    }

    #[test]
    fn test_iteration_loads_in_order_and_releases_store() {
        let store = sample_store();
        let mut layers = LayerSet::read(store.clone(), true).unwrap();

        let mut iter = layers.layers();
        assert_eq!(iter.next().unwrap().unwrap().name(), "foreground");
        assert_eq!(iter.next().unwrap().unwrap().name(), "background");
        drop(iter);
        assert!(layers.is_loaded("background"));
        assert!(!layers.is_loaded("sketches"));

        // restartable; the second pass only loads what is left
        let names: Vec<String> = layers
            .layers()
            .map(|layer| layer.unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["foreground", "background", "sketches"]);
        assert_eq!(store.borrow().read_count("background"), 1);
        assert_eq!(store.borrow().read_count("sketches"), 1);
        assert!(!layers.has_store());
    }

    #[test]
    fn test_deleting_last_pending_layer_releases_store() {
        let mut layers = LayerSet::read(sample_store(), true).unwrap();
        layers.get("background").unwrap();
        assert!(layers.has_store());
        layers.delete("sketches").unwrap();
        assert!(!layers.has_store());
    }

    #[test]
    fn test_store_without_default_layer_fails() {
        let store = shared(MemoryStore::new("public.default").with_layer("foreground", []));
        let result = LayerSet::read(store, true);
        assert!(matches!(result, Err(LayerSetError::Structural(_))));
    }
}

#[cfg(test)]
mod mutation_tests {
    use crate::core::errors::LayerSetError;
    use crate::data::{shared, MemoryStore};
    use crate::font_source::{Glyph, Layer, LayerSet};

    fn lazy_set() -> LayerSet {
        let store = shared(
            MemoryStore::new("public.default")
                .with_layer("public.default", [Glyph::new("a"), Glyph::new("b")])
                .with_layer("background", [Glyph::new("a"), Glyph::new("c")])
                .with_layer("sketches", [Glyph::new("d")]),
        );
        LayerSet::read(store, true).unwrap()
    }

    fn glyph_keys(layers: &mut LayerSet) -> Vec<(String, Vec<String>)> {
        layers
            .layers()
            .map(|layer| {
                let layer = layer.unwrap();
                (
                    layer.name().to_string(),
                    layer.glyph_names().map(str::to_string).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_delete_default_always_fails() {
        let mut single = LayerSet::default();
        assert!(matches!(
            single.delete("public.default"),
            Err(LayerSetError::Conflict(_))
        ));

        let mut layers = lazy_set();
        assert!(matches!(
            layers.delete("public.default"),
            Err(LayerSetError::Conflict(_))
        ));
        assert_eq!(layers.len(), 3);
    }

    #[test]
    fn test_delete_pending_layer() {
        let mut layers = lazy_set();
        let entry = layers.delete("sketches").unwrap();
        assert!(entry.is_pending());
        assert!(!layers.contains("sketches"));
        assert_eq!(layers.layer_order(), vec!["public.default", "background"]);
        assert!(matches!(
            layers.delete("sketches"),
            Err(LayerSetError::Lookup { .. })
        ));
    }

    #[test]
    fn test_new_layer_appends() {
        let mut layers = lazy_set();
        let layer = layers.new_layer("outlines").unwrap();
        assert!(layer.is_empty());
        assert!(!layer.is_default());
        assert_eq!(layers.layer_order().last().unwrap(), "outlines");

        assert!(matches!(
            layers.new_layer("background"),
            Err(LayerSetError::Conflict(_))
        ));
        assert!(matches!(
            layers.new_layer(""),
            Err(LayerSetError::Validation(_))
        ));
    }

    #[test]
    fn test_layer_order_is_a_copy() {
        let mut layers = lazy_set();
        let mut order = layers.layer_order();
        order.reverse();
        assert_eq!(layers.layer_order(), vec!["public.default", "background", "sketches"]);

        layers.set_layer_order(&order).unwrap();
        assert_eq!(layers.layer_order(), vec!["sketches", "background", "public.default"]);
        // reordering never loads anything
        assert!(!layers.is_loaded("sketches"));
    }

    #[test]
    fn test_layer_order_must_be_permutation() {
        let mut layers = lazy_set();
        let before = layers.layer_order();
        for bad in [
            vec!["public.default", "background"],
            vec!["public.default", "background", "sketches", "extra"],
            vec!["public.default", "background", "background"],
            vec!["public.default", "background", "nope"],
        ] {
            assert!(matches!(
                layers.set_layer_order(&bad),
                Err(LayerSetError::Validation(_))
            ));
            assert_eq!(layers.layer_order(), before);
        }
    }

    #[test]
    fn test_rename_layer() {
        let mut layers = lazy_set();
        layers.rename_layer("background", "bg", false).unwrap();
        // a renamed layer goes to the end, like any inserted key
        assert_eq!(layers.layer_order(), vec!["public.default", "sketches", "bg"]);
        assert!(!layers.contains("background"));
        assert_eq!(layers.get("bg").unwrap().name(), "bg");

        // same name is a no-op
        layers.rename_layer("bg", "bg", false).unwrap();
        assert!(matches!(
            layers.rename_layer("nope", "other", false),
            Err(LayerSetError::Lookup { .. })
        ));
    }

    #[test]
    fn test_rename_layer_moves_to_end() {
        let mut layers = LayerSet::from_layers(
            [Layer::new("public.default"), Layer::new("a"), Layer::new("b")],
            None,
        )
        .unwrap();
        layers.rename_layer("a", "z", false).unwrap();
        assert_eq!(layers.layer_order(), vec!["public.default", "b", "z"]);

        layers.rename_layer("public.default", "foreground", false).unwrap();
        assert_eq!(layers.layer_order(), vec!["b", "z", "foreground"]);
        assert_eq!(layers.default_layer_name(), "foreground");
    }

    #[test]
    fn test_rename_layer_materializes_pending() {
        let mut layers = lazy_set();
        assert!(!layers.is_loaded("sketches"));
        layers.rename_layer("sketches", "drafts", false).unwrap();
        assert!(layers.is_loaded("drafts"));
        assert!(layers.get("drafts").unwrap().contains("d"));
    }

    #[test]
    fn test_rename_layer_conflicts() {
        let mut layers = lazy_set();
        assert!(matches!(
            layers.rename_layer("background", "sketches", false),
            Err(LayerSetError::Conflict(_))
        ));
        assert!(matches!(
            layers.rename_layer("background", "public.default", true),
            Err(LayerSetError::Conflict(_))
        ));

        layers.rename_layer("background", "sketches", true).unwrap();
        assert_eq!(layers.layer_order(), vec!["public.default", "sketches"]);
        assert!(layers.get("sketches").unwrap().contains("c"));
    }

    #[test]
    fn test_rename_default_layer_moves_default() {
        let mut layers = lazy_set();
        layers.rename_layer("public.default", "foreground", false).unwrap();
        assert_eq!(layers.default_layer_name(), "foreground");
        assert_eq!(layers.default_layer().unwrap().name(), "foreground");
        assert!(matches!(
            layers.delete("foreground"),
            Err(LayerSetError::Conflict(_))
        ));
        layers.new_layer("public.default").unwrap();
        assert!(!layers.get("public.default").unwrap().is_default());
    }

    #[test]
    fn test_rename_glyph_across_layers() {
        let mut layers = lazy_set();
        layers.rename_glyph("a", "A", false).unwrap();

        let default = layers.get("public.default").unwrap();
        assert!(!default.contains("a"));
        assert_eq!(default.get("A").unwrap().name(), "A");
        let background = layers.get("background").unwrap();
        assert_eq!(background.get("A").unwrap().name(), "A");
        assert!(background.contains("c"));

        // layers without the glyph are untouched
        let sketches = layers.get("sketches").unwrap();
        assert_eq!(sketches.glyph_names().collect::<Vec<_>>(), vec!["d"]);
    }

    #[test]
    fn test_rename_glyph_conflict_leaves_state_unchanged() {
        let mut layers = lazy_set();
        let before = glyph_keys(&mut layers);

        // "c" exists only in the background layer
        let err = layers.rename_glyph("a", "c", false).unwrap_err();
        assert!(matches!(err, LayerSetError::Conflict(_)));
        assert_eq!(glyph_keys(&mut layers), before);
    }

    #[test]
    fn test_rename_glyph_overwrite() {
        let mut layers = lazy_set();
        layers.rename_glyph("a", "c", true).unwrap();

        let background = layers.get("background").unwrap();
        assert_eq!(background.glyph_names().collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(background.get("c").unwrap().name(), "c");

        let default = layers.get("public.default").unwrap();
        assert_eq!(default.glyph_names().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_rename_missing_glyph_fails() {
        let mut layers = lazy_set();
        assert!(matches!(
            layers.rename_glyph("zzz", "a", true),
            Err(LayerSetError::Lookup { kind: "Glyph", .. })
        ));
        // same name is a no-op, even for unknown glyphs
        layers.rename_glyph("zzz", "zzz", false).unwrap();
    }

    #[test]
    fn test_glyph_edits_through_layers_mut() {
        let mut layers = LayerSet::from_layers([Layer::new("public.default")], None).unwrap();
        for layer in layers.layers_mut() {
            layer.unwrap().insert_glyph(Glyph::new("x").with_width(300.0));
        }
        let layer = layers.default_layer_mut().unwrap();
        layer.get_mut("x").unwrap().width = 320.0;
        assert_eq!(layers.get("public.default").unwrap().get("x").unwrap().width, 320.0);
    }
}

#[cfg(test)]
mod write_tests {
    use crate::data::{shared, BackingStore, MemoryStore, SharedStore, StoreCall};
    use crate::font_source::{Glyph, LayerSet};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn origin() -> Rc<RefCell<MemoryStore>> {
        shared(
            MemoryStore::new("public.default")
                .with_layer("public.default", [Glyph::new("a")])
                .with_layer("background", [Glyph::new("a"), Glyph::new("b")])
                .with_layer("sketches", [Glyph::new("c")]),
        )
    }

    #[test]
    fn test_in_place_write_deletes_orphans_and_skips_pending() {
        let store = origin();
        let handle: SharedStore = store.clone();
        let mut layers = LayerSet::read(handle.clone(), true).unwrap();
        layers.delete("sketches").unwrap();
        layers.new_layer("outlines").unwrap();
        store.borrow().clear_calls();

        layers.write(&handle, None).unwrap();

        let store = store.borrow();
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Delete("sketches".to_string()),
                StoreCall::Write("public.default".to_string()),
                StoreCall::Write("outlines".to_string()),
                StoreCall::CommitOrder(vec![
                    "public.default".to_string(),
                    "background".to_string(),
                    "outlines".to_string(),
                ]),
            ]
        );
        assert_eq!(store.read_count("background"), 0);
        // the skipped layer kept its stored glyphs
        assert_eq!(store.glyph_names("background"), vec!["a", "b"]);
        assert!(!store.has_layer("sketches"));
    }

    #[test]
    fn test_in_place_write_after_store_release() {
        let store = origin();
        let handle: SharedStore = store.clone();
        let mut layers = LayerSet::read(handle.clone(), true).unwrap();
        layers.unlazify().unwrap();
        assert!(!layers.has_store());

        layers.delete("background").unwrap();
        layers.write(&handle, None).unwrap();
        assert!(!store.borrow().has_layer("background"));
        assert_eq!(
            store.borrow().layer_names().unwrap(),
            vec!["public.default", "sketches"]
        );
    }

    #[test]
    fn test_renamed_layer_replaces_old_name_in_store() {
        let store = origin();
        let handle: SharedStore = store.clone();
        let mut layers = LayerSet::read(handle.clone(), true).unwrap();
        layers.rename_layer("background", "bg", false).unwrap();
        layers.write(&handle, None).unwrap();

        let store = store.borrow();
        assert!(!store.has_layer("background"));
        assert_eq!(store.glyph_names("bg"), vec!["a", "b"]);
        assert_eq!(store.layer_names().unwrap(), vec!["public.default", "sketches", "bg"]);
    }

    #[test]
    fn test_save_as_loads_pending_and_skips_diff() {
        let source = origin();
        let mut layers = LayerSet::read(source.clone(), true).unwrap();

        let target = shared(MemoryStore::new("public.default").with_layer("stale", []));
        let target_handle: SharedStore = target.clone();
        layers.write(&target_handle, None).unwrap();

        assert_eq!(source.borrow().read_count("background"), 1);
        assert_eq!(source.borrow().read_count("sketches"), 1);
        assert!(!layers.has_store());

        let target = target.borrow();
        assert!(!target
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Delete(_))));
        assert!(target.has_layer("stale"));
        assert_eq!(target.glyph_names("background"), vec!["a", "b"]);
        assert_eq!(target.glyph_names("sketches"), vec!["c"]);
        assert_eq!(
            target.layer_names().unwrap(),
            vec!["public.default", "background", "sketches", "stale"]
        );
    }

    #[test]
    fn test_forced_save_as_on_origin_rewrites_everything() {
        let store = origin();
        let handle: SharedStore = store.clone();
        let mut layers = LayerSet::read(handle.clone(), true).unwrap();
        store.borrow().clear_calls();

        layers.write(&handle, Some(true)).unwrap();

        let writes = store
            .borrow()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, StoreCall::Write(_)))
            .count();
        assert_eq!(writes, 3);
        assert_eq!(store.borrow().glyph_names("sketches"), vec!["c"]);
    }

    #[test]
    fn test_written_glyphs_carry_new_names() {
        let store = origin();
        let handle: SharedStore = store.clone();
        let mut layers = LayerSet::read(handle.clone(), true).unwrap();
        layers.rename_glyph("a", "A", false).unwrap();
        layers.write(&handle, None).unwrap();

        let store = store.borrow();
        assert_eq!(store.glyph_names("background"), vec!["A", "b"]);
        assert_eq!(store.glyph("background", "A").unwrap().name(), "A");
    }

    #[test]
    fn test_set_built_in_memory_saves_as() {
        let mut layers = LayerSet::default();
        layers
            .default_layer_mut()
            .unwrap()
            .insert_glyph(Glyph::new("space").with_codepoint(' '));
        let target = shared(MemoryStore::new("public.default"));
        let handle: SharedStore = target.clone();
        layers.write(&handle, None).unwrap();
        assert_eq!(target.borrow().glyph_names("public.default"), vec!["space"]);
    }

    #[test]
    fn test_dropped_origin_is_not_treated_as_target() {
        let mut layers = {
            let origin = origin();
            LayerSet::read(origin, false).unwrap()
        };

        let target = shared(MemoryStore::new("public.default").with_layer("stale", []));
        let handle: SharedStore = target.clone();
        layers.write(&handle, None).unwrap();

        let target = target.borrow();
        assert!(!target
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Delete(_))));
        assert!(target.has_layer("stale"));
        assert_eq!(target.glyph_names("sketches"), vec!["c"]);
    }
}
