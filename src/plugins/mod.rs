pub mod server;

use tokio::{task::JoinHandle, time::sleep};

use crate::{prelude::*, state::AppState};

/// Delay before a crashed plugin is started again.
const RESTART_BACKOFF: Duration = Duration::from_secs(5);

#[async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Runs every registered plugin in its own task and restarts it when it
/// stops or panics.
#[derive(Default)]
pub struct Supervisor {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl Supervisor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub fn run(self, app: Arc<AppState>) -> Vec<JoinHandle<()>> {
    self
      .plugins
      .into_iter()
      .map(|plugin| tokio::spawn(supervise(plugin, app.clone())))
      .collect()
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  info!("Plugin `{name}` initialized");

  loop {
    let task = tokio::spawn({
      let plugin = plugin.clone();
      let app = app.clone();
      async move { plugin.start(app).await }
    });

    match task.await {
      Ok(Ok(())) => warn!("Plugin `{name}` stopped unexpectedly"),
      Ok(Err(err)) => error!("Plugin `{name}` crashed: {err:#}"),
      Err(err) => error!("Plugin `{name}` panicked: {err}"),
    }

    sleep(RESTART_BACKOFF).await;
    info!("Restarting plugin `{name}`...");
  }
}
