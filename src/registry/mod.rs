pub mod config;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::module::Module;
use crate::protocol::cut_first_word;

/// Name-keyed table of control units. Command lines arriving from the
/// console are addressed `"<module> <command…>"`; the registry routes the
/// remainder of the line to the named module and drives every module's
/// periodic tick.
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Box<dyn Module>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// Runs the module's setup and adds it to the table.
    pub async fn register(&self, mut module: Box<dyn Module>) -> Result<()> {
        module.setup().await?;
        let name = module.name().to_string();
        info!("Registered module: {}", name);
        let mut modules = self.modules.write().await;
        modules.insert(name, module);
        Ok(())
    }

    pub async fn module_names(&self) -> Vec<String> {
        let modules = self.modules.read().await;
        modules.keys().cloned().collect()
    }

    /// Routes one console line to the addressed module.
    pub async fn dispatch(&self, line: &str) -> Result<()> {
        let (name, rest) = cut_first_word(line);
        let mut modules = self.modules.write().await;
        let module = modules
            .get_mut(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown module: {}", name))?;
        module.handle_command(rest).await
    }

    pub async fn tick_all(&self) {
        let mut modules = self.modules.write().await;
        for (name, module) in modules.iter_mut() {
            if let Err(e) = module.tick().await {
                error!("Tick failed for {}: {}", name, e);
            }
        }
    }

    /// Stops every module. Called on shutdown.
    pub async fn stop_all(&self) {
        let mut modules = self.modules.write().await;
        for (name, module) in modules.iter_mut() {
            debug!("Stopping module: {}", name);
            if let Err(e) = module.stop().await {
                error!("Stop failed for {}: {}", name, e);
            }
        }
    }

    /// Spawns the periodic tick loop.
    pub fn run(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.tick_all().await;
            }
        })
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        name: String,
        commands: Arc<tokio::sync::Mutex<Vec<String>>>,
        ticks: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Module for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn tick(&mut self) -> Result<()> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn handle_command(&mut self, line: &str) -> Result<()> {
            self.commands.lock().await.push(line.to_string());
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            self.stopped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn probe(name: &str) -> (Probe, Arc<tokio::sync::Mutex<Vec<String>>>, Arc<AtomicUsize>) {
        let commands = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ticks = Arc::new(AtomicUsize::new(0));
        let module = Probe {
            name: name.to_string(),
            commands: commands.clone(),
            ticks: ticks.clone(),
            stopped: Arc::new(AtomicUsize::new(0)),
        };
        (module, commands, ticks)
    }

    #[tokio::test]
    async fn test_dispatch_routes_remainder() {
        let registry = ModuleRegistry::new();
        let (module, commands, _) = probe("x");
        registry.register(Box::new(module)).await.unwrap();

        registry.dispatch("x move 50.0").await.unwrap();

        assert_eq!(commands.lock().await.as_slice(), ["move 50.0"]);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_module() {
        let registry = ModuleRegistry::new();
        let err = registry.dispatch("nope move 1").await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown module: nope");
    }

    #[tokio::test]
    async fn test_tick_all_reaches_every_module() {
        let registry = ModuleRegistry::new();
        let (a, _, ticks_a) = probe("a");
        let (b, _, ticks_b) = probe("b");
        registry.register(Box::new(a)).await.unwrap();
        registry.register(Box::new(b)).await.unwrap();

        registry.tick_all().await;
        registry.tick_all().await;

        assert_eq!(ticks_a.load(Ordering::SeqCst), 2);
        assert_eq!(ticks_b.load(Ordering::SeqCst), 2);
    }
}
