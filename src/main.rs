use anyhow::{Context, Result};
use rune_motion::{
    AnimationDefinition, Easing, InstanceAttribute, MotionEngine, MotionEvent, NodeId,
    TrackDefinition, UniformCell,
};
use rune_motion_config::MotionConfig;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

mod graph;
use graph::Graph;

const TRANSITION: &str = "main";
const HIGHLIGHT: &str = "highlight";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MotionConfig::load();
    let definition = match &config.driver.definition {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading animation definition {}", path.display()))?;
            AnimationDefinition::from_json(&json)
                .with_context(|| format!("parsing animation definition {}", path.display()))?
        }
        None => builtin_definition(),
    };
    log::info!(
        "playing '{}' ({}s, {} phases, {} tracks) for {} frames at {} fps",
        definition.name,
        definition.duration,
        definition.phases.len(),
        definition.tracks.len(),
        config.driver.frames,
        config.driver.frame_rate
    );

    let mut engine = MotionEngine::from_config(&config);

    let counts: Rc<RefCell<BTreeMap<&'static str, usize>>> = Rc::default();
    let transition = engine.add_transition(TRANSITION);
    let sink = Rc::clone(&counts);
    transition.subscribe(move |event| {
        *sink.borrow_mut().entry(event.tag()).or_default() += 1;
        match event {
            MotionEvent::TrackUpdate { track, value } => log::trace!("{track} = {value:?}"),
            MotionEvent::PhaseProgress { .. } => log::trace!("{event:?}"),
            _ => log::info!("{} {:?}", event.tag(), event),
        }
    });
    transition
        .play(Some(Rc::new(definition)))
        .context("starting transition")?;

    let clock = UniformCell::default();
    engine
        .loops_mut()
        .register("clock", clock.clone())
        .with_frequency(0.5);

    let graph = Graph::from_edges(&[
        ("hub", "alpha"),
        ("hub", "beta"),
        ("alpha", "gamma"),
        ("beta", "delta"),
        ("gamma", "omega"),
        ("delta", "omega"),
    ]);
    let nodes: Vec<NodeId> = graph.nodes().cloned().collect();
    let (from, to) = (NodeId::from("hub"), NodeId::from("omega"));
    if !engine.set_path_finder(graph).start_pulse(&from, &to) {
        log::warn!("no path from {from} to {to}");
    }

    engine
        .bindings_mut()
        .register_attribute(HIGHLIGHT, InstanceAttribute::new(nodes.len()));
    let highlight = engine
        .bindings_mut()
        .create_binding(HIGHLIGHT, 0, false, |on: &bool| if *on { 1.0 } else { 0.0 });

    let frame_delta = config.driver.frame_delta();
    let halfway = config.driver.frames / 2;
    for frame in 0..config.driver.frames {
        if frame == halfway {
            log::info!("frame {frame}: highlight on");
            highlight.borrow_mut().set_state(true);
        }
        engine.tick(frame_delta);
    }

    log::info!(
        "done: {} frames, elapsed {:.3}s, clock uniform {:.3}",
        engine.time().frame(),
        engine.time().elapsed(),
        clock.get()
    );
    for (tag, count) in counts.borrow().iter() {
        log::info!("  {tag}: {count}");
    }
    if let Some(propagation) = engine.propagation() {
        log::info!("propagation {:?} along {} nodes", propagation.mode(), propagation.path().len());
        for node in &nodes {
            log::info!("  {node}: {:.3}", propagation.get_node_intensity(node));
        }
    }
    if let Some(attribute) = engine.bindings().attribute(HIGHLIGHT) {
        log::info!("{HIGHLIGHT} = {:?} (version {})", attribute.values(), attribute.version());
    }

    engine.dispose();
    Ok(())
}

/// Two-phase reveal used when no definition file is configured.
fn builtin_definition() -> AnimationDefinition {
    AnimationDefinition::new("reveal", 1.5)
        .phase("appear", 0.0, 0.4)
        .phase("settle", 0.4, 1.0)
        .track(
            TrackDefinition::new("scale")
                .keyframe(0.0, 0.0)
                .keyframe(0.4, 1.1)
                .keyframe(1.0, 1.0)
                .easing(Easing::EaseOutCubic),
        )
        .track(
            TrackDefinition::new("color")
                .keyframe(0.0, [0.2, 0.4, 1.0])
                .keyframe(1.0, [1.0, 0.8, 0.2])
                .easing(Easing::EaseInOutCubic),
        )
}
