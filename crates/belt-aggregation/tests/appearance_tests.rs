use belt_aggregation::{
    aggregate, AggregationFunction, AggregationManager, AggregationOptions, AppearanceMode,
    AppearanceOptions, ExecutionContext, NominalAppearanceAggregationManager,
    NominalAppearanceFunction, MAX_MAPPING_SIZE,
};
use belt_columnar::{Column, Dictionary, NumericRowReader, Value};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn feed(
    manager: &NominalAppearanceAggregationManager,
    column: &Column,
    start: usize,
    end: usize,
) -> NominalAppearanceFunction {
    let mut function = manager.new_function();
    let mut reader = NumericRowReader::with_range(vec![column], start, end);
    while reader.has_remaining() {
        reader.advance();
        function.accept(&reader);
    }
    function
}

fn manager(mode: AppearanceMode, column: &Column) -> NominalAppearanceAggregationManager {
    let mut manager = NominalAppearanceAggregationManager::new(mode);
    manager.initialize(column, 0).unwrap();
    manager
}

fn sparse_column() -> Column {
    let mut values: Vec<Option<&str>> = vec![None; 23];
    values[3] = Some("bla");
    values[11] = Some("blup");
    values[17] = Some("bla");
    Column::nominal(values)
}

fn cyclic_column() -> Column {
    Column::nominal((0..20).map(|i| {
        Some(if i % 3 == 0 {
            "bla"
        } else if i % 2 == 0 {
            "x"
        } else {
            "blup"
        })
    }))
}

#[test]
fn mode_and_least_over_mostly_missing_column() {
    let column = sparse_column();

    let most = feed(&manager(AppearanceMode::Most, &column), &column, 0, 23);
    assert_eq!(most.result(), Some("bla"));
    assert_eq!(most.counter().best_count(), 2);

    let least = feed(&manager(AppearanceMode::Least, &column), &column, 0, 23);
    assert_eq!(least.result(), Some("blup"));
    assert_eq!(least.counter().best_count(), 1);
}

#[test]
fn merged_halves_match_single_pass() {
    let column = cyclic_column();
    for (mode, expected) in [(AppearanceMode::Most, "bla"), (AppearanceMode::Least, "x")] {
        let manager = manager(mode, &column);
        let single = feed(&manager, &column, 0, 20);

        let mut merged = feed(&manager, &column, 0, 10);
        merged.merge(&feed(&manager, &column, 10, 20));

        assert_eq!(single.result(), Some(expected), "{mode:?}");
        assert_eq!(merged.result(), single.result(), "{mode:?}");
        assert_eq!(
            merged.counter().best_count(),
            single.counter().best_count(),
            "{mode:?}"
        );
    }
}

#[test]
fn aggregate_returns_one_row() {
    let column = cyclic_column();
    let options = AggregationOptions {
        partition_rows: 7,
        ..AggregationOptions::default()
    };
    let mut manager = NominalAppearanceAggregationManager::new(AppearanceMode::Most);
    let out = aggregate(&mut manager, &column, &options, &ExecutionContext::with_threads(2))
        .unwrap();
    assert_eq!(out.to_values(), vec![Value::from("bla")]);
    // Only the winning category survives in the output dictionary.
    assert_eq!(out.dictionary().unwrap().size(), 1);
}

#[test]
fn all_missing_yields_missing() {
    let column = Column::nominal([None::<&str>, None, None]);
    let mut manager = NominalAppearanceAggregationManager::new(AppearanceMode::Least);
    let out = aggregate(
        &mut manager,
        &column,
        &AggregationOptions::default(),
        &ExecutionContext::sequential(),
    )
    .unwrap();
    assert_eq!(out.to_values(), vec![Value::Missing]);
}

#[test]
fn large_dictionary_promotes_without_losing_best() {
    let size = MAX_MAPPING_SIZE + 1;
    let dictionary = Arc::new(Dictionary::new((0..size).map(|i| format!("v{i}"))).unwrap());
    // One category three times, then one occurrence of each other category.
    let mut indices = vec![5u32, 5, 5];
    indices.extend((1..=size as u32).filter(|&i| i != 5));
    let column = Column::categorical(indices.clone(), dictionary).unwrap();

    let manager = manager(AppearanceMode::Most, &column);
    let mut function = manager.new_function();
    let mut reader = NumericRowReader::new(vec![&column]);
    let mut promoted_at = None;
    while reader.has_remaining() {
        reader.advance();
        function.accept(&reader);
        if promoted_at.is_none() && function.counter().is_dense() {
            promoted_at = Some(reader.position());
            assert_eq!(function.result(), Some("v4"));
            assert_eq!(function.counter().best_count(), 3);
        }
    }
    assert!(promoted_at.is_some());
    assert_eq!(function.result(), Some("v4"));
    assert_eq!(function.counter().best_count(), 3);
    assert_eq!(function.counter().distinct(), size);
}

#[test]
fn sparse_and_dense_counting_agree() {
    let column = cyclic_column();
    let dense = AppearanceOptions {
        dense_threshold: usize::MAX,
        ..AppearanceOptions::default()
    };
    let sparse = AppearanceOptions {
        dense_threshold: 0,
        fill_ratio: 1,
    };
    for mode in [AppearanceMode::Most, AppearanceMode::Least] {
        let results: Vec<_> = [dense, sparse]
            .into_iter()
            .map(|options| {
                let mut manager = NominalAppearanceAggregationManager::with_options(mode, options);
                manager.initialize(&column, 0).unwrap();
                let mut left = feed(&manager, &column, 0, 13);
                left.merge(&feed(&manager, &column, 13, 20));
                (left.result().map(str::to_owned), left.counter().best_count())
            })
            .collect();
        assert_eq!(results[0], results[1], "{mode:?}");
    }
}
