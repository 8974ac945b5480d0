/// Generic lifecycle shared by every control unit on the bus. An external
/// scheduler drives the methods sequentially; none of them may block beyond
/// ordinary awaiting, and `tick` is called on a fixed cadence.
#[async_trait::async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// One-time initialization, run when the module is registered.
    async fn setup(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Periodic work: status reporting, telemetry polling, autonomous
    /// transitions.
    async fn tick(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Handles one text command line addressed to this module.
    async fn handle_command(&mut self, line: &str) -> anyhow::Result<()>;

    /// Brings the module to a safe standstill.
    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
