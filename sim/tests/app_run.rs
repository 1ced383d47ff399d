use std::io::Cursor;

use anyhow::Result;
use protocol::{read_framed, SimMessage};
use sim::{build_sim_app, parse_config, FrameSink, SharedBuffer, SimStats, Simulation};

#[test]
fn app_steps_and_streams_frames() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cfg = parse_config(
        r#"
        ticks = 40
        frame_every = 10

        [[spiders]]
        preset = "quadruped"
        spawn = [0.0, 1.2, 0.0]
        "#,
    )?;
    let buffer = SharedBuffer::default();
    let mut app = build_sim_app(cfg)?;
    app.insert_resource(FrameSink::new(buffer.clone()));

    for _ in 0..40 {
        app.update();
    }
    let tick = app.world().resource::<Simulation>().tick();
    assert_eq!(tick, 40);
    assert!(app.should_exit().is_some(), "app should ask to exit once the tick budget is spent");

    let mut cursor = Cursor::new(buffer.contents());
    let mut frames = Vec::new();
    let mut hello = 0;
    while let Some(msg) = read_framed::<_, SimMessage>(&mut cursor)? {
        match msg {
            SimMessage::Hello { spider_count, .. } => {
                assert_eq!(spider_count, 1);
                hello += 1;
            }
            SimMessage::Frame(frame) => frames.push(frame),
            SimMessage::Event(_) => {}
        }
    }
    assert_eq!(hello, 1);
    assert_eq!(frames.iter().map(|f| f.tick).collect::<Vec<_>>(), vec![10, 20, 30, 40]);
    for frame in &frames {
        assert_eq!(frame.legs.len(), 4);
        assert!(frame.position.iter().all(|v| v.is_finite()), "frame={frame:?}");
        assert!(frame.legs.iter().all(|leg| leg.segments.len() == 3));
    }
    Ok(())
}

#[test]
fn scheduled_knockback_is_counted() -> Result<()> {
    let cfg = parse_config(
        r#"
        ticks = 30
        frame_every = 0

        [[spiders]]
        preset = "hexapod"

        [[actions]]
        at_tick = 15
        spider = 0
        kind = "knockback"
        direction = [1.0, 0.0, 0.0]
        hit_from = [-2.0, 1.0, 0.0]
        "#,
    )?;
    let mut app = build_sim_app(cfg)?;
    for _ in 0..20 {
        app.update();
    }
    let stats = *app.world().resource::<SimStats>();
    assert_eq!(stats.knockbacks, 1, "stats={stats:?}");
    Ok(())
}
