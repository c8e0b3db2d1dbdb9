use proptest::prelude::*;
use rstest::rstest;
use thermo_model::{
    ForestParams, ModelError, ModelSpec, RandomForest, RegressionTree, TrainedModel, TreeParams,
    evaluate,
};
use thermo_traits::{EnsembleRegressor, Regressor, Trainer};

/// Hour-of-day rows shaped like the calendar encoding: warm afternoons, cool nights.
fn diurnal(days: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for d in 0..days {
        for h in 0..24u32 {
            let afternoon = (12..=16).contains(&h);
            let night = !(5..=20).contains(&h);
            x.push(vec![
                f64::from(h),
                (d % 7) as f64,
                f64::from(u8::from((5..=11).contains(&h))),
                f64::from(u8::from(afternoon)),
                f64::from(u8::from((17..=20).contains(&h))),
                f64::from(u8::from(night)),
            ]);
            y.push(if afternoon {
                28.0
            } else if night {
                18.0
            } else {
                23.0
            });
        }
    }
    (x, y)
}

#[rstest]
#[case::forest(ModelSpec::RandomForest(ForestParams { n_estimators: 10, ..ForestParams::default() }))]
#[case::tree(ModelSpec::DecisionTree(TreeParams::default()))]
fn learns_daily_cycle(#[case] spec: ModelSpec) {
    let (x, y) = diurnal(7);
    let model = spec.train(&x, &y).unwrap();
    let eval = evaluate(&model, &x, &y).unwrap();
    assert!(eval.rmse < 0.5, "rmse {}", eval.rmse);
    assert!(eval.r2 > 0.95, "r2 {}", eval.r2);
}

#[test]
fn forest_members_are_its_trees() {
    let (x, y) = diurnal(3);
    let params = ForestParams {
        n_estimators: 7,
        ..ForestParams::default()
    };
    let forest = Trainer::fit(&params, &x, &y).unwrap();
    assert_eq!(forest.sub_estimators().len(), 7);
    assert_eq!(forest.n_features(), 6);
}

#[test]
fn tree_is_a_single_member_ensemble() {
    let (x, y) = diurnal(2);
    let tree = Trainer::fit(&TreeParams::default(), &x, &y).unwrap();
    let members = tree.member_predictions(&x[0]).unwrap();
    assert_eq!(members, vec![tree.predict(&x[0]).unwrap()]);
}

#[test]
fn persisted_model_predicts_identically() {
    let (x, y) = diurnal(3);
    let model = ModelSpec::RandomForest(ForestParams {
        n_estimators: 4,
        ..ForestParams::default()
    })
    .train(&x, &y)
    .unwrap();
    let json = serde_json::to_string(&model).unwrap();
    assert!(json.starts_with(r#"{"kind":"random_forest""#));
    let back: TrainedModel = serde_json::from_str(&json).unwrap();
    for row in &x {
        assert_eq!(back.predict(row).unwrap(), model.predict(row).unwrap());
    }
}

#[test]
fn different_seeds_differ() {
    let (x, y) = diurnal(3);
    // row-level jitter so bootstrap samples change leaf means
    let y: Vec<f64> = y
        .iter()
        .enumerate()
        .map(|(i, v)| v + (i % 5) as f64 * 0.1)
        .collect();
    let fit = |seed| {
        RandomForest::fit(
            &x,
            &y,
            &ForestParams {
                n_estimators: 5,
                seed,
                ..ForestParams::default()
            },
        )
        .unwrap()
    };
    assert_eq!(fit(1), fit(1));
    assert_ne!(fit(1), fit(2));
}

#[test]
fn bad_designs_are_rejected() {
    let p = TreeParams::default();
    assert_eq!(
        RegressionTree::fit(&[], &[], &p),
        Err(ModelError::EmptyTrainingSet)
    );
    assert_eq!(
        RegressionTree::fit(&[vec![1.0], vec![2.0]], &[1.0], &p),
        Err(ModelError::ShapeMismatch {
            expected: 2,
            got: 1
        })
    );
    assert!(matches!(
        RegressionTree::fit(&[vec![1.0], vec![2.0, 3.0]], &[1.0, 2.0], &p),
        Err(ModelError::ShapeMismatch { .. })
    ));
    let tree = RegressionTree::fit(&[vec![1.0], vec![2.0]], &[1.0, 2.0], &p).unwrap();
    assert!(tree.predict(&[1.0, 2.0]).is_err());
}

#[rstest]
#[case(TreeParams { max_depth: 0, ..TreeParams::default() })]
#[case(TreeParams { min_samples_split: 1, ..TreeParams::default() })]
#[case(TreeParams { min_samples_leaf: 0, ..TreeParams::default() })]
fn invalid_tree_params(#[case] p: TreeParams) {
    assert!(matches!(
        RegressionTree::fit(&[vec![1.0]], &[1.0], &p),
        Err(ModelError::InvalidParams(_))
    ));
}

#[test]
fn min_samples_leaf_bounds_leaf_size() {
    let x: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i)]).collect();
    let y: Vec<f64> = (0..10).map(f64::from).collect();
    let p = TreeParams {
        min_samples_leaf: 5,
        ..TreeParams::default()
    };
    let t = RegressionTree::fit(&x, &y, &p).unwrap();
    assert_eq!(t.n_leaves(), 2);
}

proptest! {
    #[test]
    fn predictions_stay_within_label_range(
        rows in prop::collection::vec((0.0f64..24.0, -20.0f64..60.0), 1..80),
        probe in -10.0f64..40.0,
    ) {
        let x: Vec<Vec<f64>> = rows.iter().map(|(h, _)| vec![*h]).collect();
        let y: Vec<f64> = rows.iter().map(|(_, t)| *t).collect();
        let lo = y.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let forest = RandomForest::fit(&x, &y, &ForestParams { n_estimators: 3, ..ForestParams::default() }).unwrap();
        let p = forest.predict(&[probe]).unwrap();
        prop_assert!(p >= lo - 1e-9 && p <= hi + 1e-9);
    }
}
