//! Suggestion filtering and ranking through the public API

use recipe_resolver::{FuzzyMatcher, RecipeManager, SuggestionCriteria};

fn manager() -> RecipeManager {
    RecipeManager::offline().unwrap()
}

#[test]
fn test_chicken_and_tomato() {
    let manager = manager();
    let criteria = SuggestionCriteria::new().with_ingredients(["chicken", "tomato"]);
    let results = manager.suggest(&criteria);

    assert!(!results.is_empty() && results.len() <= 5);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(results[0].name, "Butter Chicken");
    assert!((results[0].score - 80.0).abs() < 1e-9);

    // every result has an ingredient close to each term
    let matcher = FuzzyMatcher::default();
    let dataset = manager.core().dataset();
    for summary in &results {
        let recipe = dataset.find_by_name(&summary.name).unwrap();
        for term in ["chicken", "tomato"] {
            assert!(
                recipe
                    .ingredient_names()
                    .any(|name| matcher.score(term, name) > 0.6),
                "{} has nothing like {}",
                summary.name,
                term
            );
        }
    }
}

#[test]
fn test_ties_keep_dataset_order() {
    let manager = manager();
    let results = manager.suggest(&SuggestionCriteria::new().with_spice_level("Mild"));
    let names: Vec<&str> = results.iter().map(|s| s.name.as_str()).collect();
    // Schnitzel is Easy (55); Roast Chicken and Cacciatore tie at 50
    assert_eq!(
        names,
        vec![
            "Chicken Schnitzel",
            "Continental Roast Chicken",
            "Chicken Cacciatore",
            "Coq au Vin"
        ]
    );
}

#[test]
fn test_filters_that_match_nothing() {
    let manager = manager();
    assert!(manager
        .suggest(&SuggestionCriteria::new().with_cooking_method("Boiled"))
        .is_empty());
    assert!(manager
        .suggest(
            &SuggestionCriteria::new()
                .with_diet("Vegetarian")
                .with_ingredients(["chicken"])
        )
        .iter()
        .all(|s| s.name == "Pani Puri"));
}

#[test]
fn test_time_and_difficulty_combined() {
    let manager = manager();
    let results = manager.suggest(
        &SuggestionCriteria::new()
            .with_difficulty("easy")
            .with_max_minutes(35),
    );
    let names: Vec<&str> = results.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Kerala Fish Molee"]);
}
