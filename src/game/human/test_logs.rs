//! Log capture for tests asserting on emitted diagnostics.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bevy::{
    ecs::schedule::ExecutorKind,
    log::tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt},
        registry,
    },
    prelude::*,
};
use tracing::{Event, Level as TracingLevel, Subscriber};

/// Counts events of one level emitted while it is the active subscriber.
struct LevelCounter {
    level: TracingLevel,
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == self.level {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` on this thread and returns how many events of `level` it logged.
pub fn count_logs(level: TracingLevel, f: impl FnOnce()) -> usize {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = registry().with(LevelCounter {
        level,
        count: count.clone(),
    });
    tracing::subscriber::with_default(subscriber, f);
    count.load(Ordering::SeqCst)
}

pub fn count_errors(f: impl FnOnce()) -> usize {
    count_logs(TracingLevel::ERROR, f)
}

/// An app whose `Update` systems run on the calling thread, so their logs
/// reach the subscriber installed by [`count_logs`].
pub fn single_threaded_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.edit_schedule(Update, |schedule| {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    });
    app
}
