use tracing::{level_filters::LevelFilter, Event, Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::format::{DefaultVisitor, Writer},
    layer::{Context, Layer},
    prelude::*,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{
    cli::arguments,
    config::{DemoConfig, LoggerConfig},
    scenario::ChatRoom,
};

pub fn run(args: arguments::Run) -> eyre::Result<()> {
    let config = match args.config {
        Some(path) => DemoConfig::from_path(path)?,
        None => DemoConfig::default(),
    };

    init_logger(&config.logger)?;

    tracing::info!(
        "Starting chat room with fault policy {:?}",
        config.bus.fault_policy
    );

    let summary = ChatRoom::new(config.bus).run(&config.scenario);

    tracing::info!(
        "Room closed: {} events seen, {} messages delivered, {} moderation faults",
        summary.events,
        summary.deliveries,
        summary.faults
    );

    Ok(())
}

fn init_logger(config: &LoggerConfig) -> eyre::Result<()> {
    let level_filter = config.level;

    let filter = Targets::new()
        .with_target("event_bus", level_filter)
        .with_target("event_bus_demo", level_filter)
        .with_default(level_filter);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env()?;

    tracing_subscriber::registry()
        .with(
            DemoTracer {
                timestamps: config.timestamps,
            }
            .with_filter(filter),
        )
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// Prints `[time] LEVEL target: message` lines to stdout.
struct DemoTracer {
    timestamps: bool,
}

impl<S> Layer<S> for DemoTracer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = match event.metadata().level() {
            &Level::INFO | &Level::WARN | &Level::ERROR => event
                .metadata()
                .target()
                .split("::")
                .last()
                .unwrap_or_default(),
            _ => event.metadata().target(),
        };

        if self.timestamps {
            print!(
                "[{}] ",
                chrono::offset::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
        }
        print!("{} {}: ", event.metadata().level(), target);

        let mut message = String::new();

        event.record(&mut DefaultVisitor::new(Writer::new(&mut message), true));

        println!("{}", message);
    }
}
