//! End-to-end behaviour on small hand-checkable instances.

use u_routega::ga::{
    operators::order_crossover_with_cuts, City, ConfigUpdate, Engine, EngineConfig,
    EvolutionRunner, RouteEvaluator, RunConfig, Selection, SharedEngine,
};
use u_routega::EngineError;

const EPS: f64 = 1e-9;

fn unit_square() -> Vec<City> {
    vec![
        City::new(0.0, 0.0),
        City::new(1.0, 0.0),
        City::new(1.0, 1.0),
        City::new(0.0, 1.0),
    ]
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for i in 0..used.len() {
            if !used[i] {
                used[i] = true;
                prefix.push(i);
                extend(prefix, used, out);
                prefix.pop();
                used[i] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}

fn brute_force(evaluator: &RouteEvaluator<'_>, n: usize) -> f64 {
    permutations(n)
        .iter()
        .map(|p| evaluator.evaluate(p).unwrap())
        .fold(f64::INFINITY, f64::min)
}

fn square_engine(final_index: Option<usize>) -> Engine {
    let mut engine = Engine::new(EngineConfig::default().with_pop_size(30).with_seed(42)).unwrap();
    engine.set_cities(unit_square(), 0, final_index).unwrap();
    engine
}

#[test]
fn closed_tour_on_unit_square_finds_perimeter() {
    let cities = unit_square();
    let optimum = brute_force(&RouteEvaluator::new(&cities, 0, 0), 4);
    assert!((optimum - 4.0).abs() < EPS);

    let mut engine = square_engine(None);
    let result =
        EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(50)).unwrap();
    assert!((result.best.distance - 4.0).abs() < EPS);
    assert_eq!(result.best.route[0], 0);
}

#[test]
fn open_path_on_unit_square() {
    let cities = unit_square();

    // Destination adjacent to the depot along the perimeter
    let optimum = brute_force(&RouteEvaluator::new(&cities, 0, 3), 4);
    assert!((optimum - 3.0).abs() < EPS);

    let mut engine = square_engine(Some(3));
    let result =
        EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(50)).unwrap();
    assert!((result.best.distance - 3.0).abs() < EPS);
    assert_eq!(result.best.route, vec![0, 1, 2, 3]);

    // Diagonal destination: every path needs one diagonal
    let optimum = brute_force(&RouteEvaluator::new(&cities, 0, 2), 4);
    assert!((optimum - (2.0 + 2f64.sqrt())).abs() < EPS);

    let mut engine = square_engine(Some(2));
    let result =
        EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(50)).unwrap();
    assert!((result.best.distance - (2.0 + 2f64.sqrt())).abs() < EPS);
    assert_eq!(result.best.route[0], 0);
    assert_eq!(result.best.route[3], 2);
}

#[test]
fn order_crossover_with_fixed_cuts() {
    let child = order_crossover_with_cuts(&[0, 1, 2, 3, 4], &[4, 3, 2, 1, 0], 1, 3);
    assert_eq!(child, vec![0, 1, 2, 4, 3]);
}

#[test]
fn advance_increments_generation_and_keeps_population_size() {
    let shared = SharedEngine::new(
        EngineConfig::default()
            .with_num_cities(20)
            .with_pop_size(40)
            .with_seed(3),
    )
    .unwrap();

    for expected in 1..=3 {
        let result = shared.advance(None, None).unwrap();
        assert_eq!(result.generation, expected);
        assert_eq!(result.route.len(), 20);
        let state = shared.current_state().unwrap();
        assert_eq!(state.generation, expected);
        assert_eq!(shared.with_engine(|e| e.population().len()).unwrap(), 40);
    }

    let result = shared.advance(Some(0.2), Some(Selection::Roulette)).unwrap();
    assert_eq!(result.generation, 4);
    let config = shared.with_engine(|e| e.config().clone()).unwrap();
    assert_eq!(config.selection_method, Selection::Roulette);
}

#[test]
fn reset_is_idempotent_in_shape() {
    let mut engine = Engine::new(
        EngineConfig::default()
            .with_num_cities(9)
            .with_pop_size(25)
            .with_seed(11),
    )
    .unwrap();
    engine.evolve(None, None).unwrap();

    engine.reset().unwrap();
    let first = (
        engine.cities().len(),
        engine.population().len(),
        engine.generation(),
    );
    engine.reset().unwrap();
    let second = (
        engine.cities().len(),
        engine.population().len(),
        engine.generation(),
    );
    assert_eq!(first, (9, 25, 0));
    assert_eq!(first, second);
}

#[test]
fn best_route_respects_depot_and_destination() {
    let cities: Vec<City> = (0..12)
        .map(|i| City::new((i * 7 % 12) as f64, (i * 5 % 12) as f64))
        .collect();
    let mut engine = Engine::new(EngineConfig::default().with_pop_size(30).with_seed(5)).unwrap();
    engine.set_cities(cities, 6, Some(2)).unwrap();

    let result =
        EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(20)).unwrap();
    assert_eq!(result.best.route[0], 6);
    assert_eq!(result.best.route[11], 2);
    let recomputed = engine.evaluator().route_length(&result.best.route).unwrap();
    assert!((recomputed - result.best.distance).abs() < EPS);
}

#[test]
fn invalid_requests_are_rejected() {
    let shared = SharedEngine::new(EngineConfig::default().with_seed(1)).unwrap();

    assert!(matches!(
        shared.set_cities(unit_square(), 7, None),
        Err(EngineError::InvalidCity(_))
    ));
    assert!(matches!(
        shared.configure(ConfigUpdate {
            pop_size: Some(0),
            ..ConfigUpdate::default()
        }),
        Err(EngineError::InvalidConfig(_))
    ));
    assert!(matches!(
        shared.advance(Some(-0.1), None),
        Err(EngineError::InvalidConfig(_))
    ));
    assert_eq!(shared.current_state().unwrap().generation, 0);
}
