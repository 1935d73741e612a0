use quadgrav::{
    scattered_system, Body, Category, ConfigError, Engine, GravityKind, NVec2, Parameters, Rect, Scenario,
    ScenarioConfig, System,
};

#[test]
fn empty_system_steps_cleanly() {
    let mut engine = Engine::new(Parameters::default(), GravityKind::BarnesHut);
    let mut sys = System::default();

    let report = engine.step(&mut sys);

    assert_eq!(sys.step, 1);
    assert_eq!(report.bodies, 0);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.tree_nodes, 1);

    let tree = engine.gravity.tree().unwrap();
    assert_eq!(tree.root().rect, Rect::new(-200.0, -200.0, 500.0, 500.0));
    assert_eq!(tree.root().mass, 0.0);
    assert_eq!(tree.root().com, NVec2::zeros());
}

#[test]
fn controlled_body_pulls_but_is_not_pulled() {
    let mut engine = Engine::new(Parameters::default(), GravityKind::BarnesHut);
    let bodies = vec![
        Body::new(1, NVec2::new(0.0, 0.0), 20.0, Category::Controlled),
        Body::new(2, NVec2::new(60.0, 0.0), 5.0, Category::Ambient),
    ];

    let acc = engine.accelerations(&bodies);
    assert_eq!(acc[0], NVec2::zeros());
    assert!(acc[1].x < 0.0);
    assert!((acc[1].x + (0.1 * 20.0) / 3600.0).abs() < 1e-15);
}

#[test]
fn direct_and_tree_engines_agree_at_small_theta() {
    let params = Parameters { theta: 1e-9, ..Parameters::default() };
    let mut direct = Engine::new(params.clone(), GravityKind::Direct);
    let mut tree = Engine::new(params, GravityKind::BarnesHut);

    let mut sys_direct = System::new(scattered_system(150, 0));
    let mut sys_tree = sys_direct.clone();

    for _ in 0..5 {
        direct.step(&mut sys_direct);
        tree.step(&mut sys_tree);
    }

    for (a, b) in sys_direct.bodies.iter().zip(sys_tree.bodies.iter()) {
        assert_eq!(a.id, b.id);
        assert!((a.x - b.x).norm() < 1e-6, "{:?} vs {:?}", a.x, b.x);
    }
}

#[test]
fn bodies_never_leave_the_world() {
    let params = Parameters { world_radius: 600.0, ..Parameters::default() };
    let mut engine = Engine::new(params, GravityKind::BarnesHut);
    let mut sys = System::new(scattered_system(300, 0));

    let mut reflected = 0;
    for _ in 0..50 {
        let report = engine.step(&mut sys);
        reflected += report.reflected;
        assert!(report.tree_depth <= engine.params.max_depth);
        assert_eq!(report.rejected, 0);
    }

    assert!(reflected > 0, "field spread over ±1000 should hit a 600 wall");
    for b in &sys.bodies {
        assert!(b.x.norm() <= 600.0 - b.radius + 1e-9, "{:?} escaped", b.id);
        assert!(b.v.x.is_finite() && b.v.y.is_finite());
    }
}

#[test]
fn scenario_runs_deterministically() {
    let text = r#"
simulation:
  theta: 0.5
  world_radius: 1200.0
  parallel: true
steps: 25
bodies:
  - { id: 1, x: [0.0, 0.0], radius: 10.0, category: massive }
  - { id: 2, x: [100.0, 0.0], v: [0.0, 0.2], radius: 5.0, category: ambient }
scatter: 200
"#;
    let run = || {
        let cfg = ScenarioConfig::from_yaml_str(text).unwrap();
        let mut scenario = Scenario::build_scenario(cfg).unwrap();
        let steps = scenario.steps;
        let summary = scenario.run(steps);
        (summary, scenario.system)
    };

    let (first, sys_a) = run();
    let (second, sys_b) = run();

    assert_eq!(first.steps, 25);
    assert_eq!(sys_a.step, 25);
    assert_eq!(sys_a.bodies.len(), 202);
    assert_eq!(first, second);
    for (a, b) in sys_a.bodies.iter().zip(sys_b.bodies.iter()) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.v, b.v);
    }

    // generated ids continue after the explicit ones
    assert_eq!(sys_a.bodies[2].id.0, 3);
}

#[test]
fn invalid_scenario_is_rejected() {
    let cfg = ScenarioConfig::from_yaml_str("simulation: { theta: -1.0 }").unwrap();
    assert!(Scenario::build_scenario(cfg).is_err());
}

#[test]
fn scatter_without_id_space_is_rejected() {
    let text = format!(
        "bodies:\n  - {{ id: {}, x: [0.0, 0.0], radius: 10.0, category: massive }}\nscatter: 3\n",
        u64::MAX
    );
    let cfg = ScenarioConfig::from_yaml_str(&text).unwrap();
    let err = Scenario::build_scenario(cfg).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    assert!(err.to_string().contains("scatter"), "{err}");
}

#[test]
fn scatter_fills_the_top_of_the_id_space() {
    let text = format!(
        "bodies:\n  - {{ id: {}, x: [0.0, 0.0], radius: 10.0, category: massive }}\nscatter: 3\n",
        u64::MAX - 3
    );
    let scenario = Scenario::build_scenario(ScenarioConfig::from_yaml_str(&text).unwrap()).unwrap();
    let ids: Vec<u64> = scenario.system.bodies.iter().map(|b| b.id.0).collect();
    assert_eq!(ids, vec![u64::MAX - 3, u64::MAX - 2, u64::MAX - 1, u64::MAX]);
}

#[test]
fn scattered_ids_stop_at_the_largest_id() {
    let bodies = scattered_system(5, u64::MAX - 1);
    let ids: Vec<u64> = bodies.iter().map(|b| b.id.0).collect();
    assert_eq!(ids, vec![u64::MAX - 1, u64::MAX]);
}
