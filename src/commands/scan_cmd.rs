use clap::Args;

use foodlog::{scan_food, Config, FoodLog, KeyValueStore, StubScanner};

#[derive(Args)]
pub struct ScanCommand {
    /// Raw `name:calories:protein` payload to scan instead of the configured one
    #[arg(long)]
    pub payload: Option<String>,

    /// Simulate cancelling the scan
    #[arg(long, conflicts_with = "payload")]
    pub cancel: bool,
}

impl ScanCommand {
    pub fn run<S: KeyValueStore>(
        &self,
        log: &mut FoodLog<S>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut scanner = if self.cancel {
            StubScanner::cancelled()
        } else {
            let payload = self
                .payload
                .clone()
                .unwrap_or_else(|| config.scan_payload.value.clone());
            StubScanner::new(payload)
        };

        match scan_food(&mut scanner) {
            Some(food) => {
                let entry = log.add_scanned(food);
                println!("Logged from scan: {}", entry);
                println!("Total: {}", log.totals());
            }
            None => println!("No entry added"),
        }
        Ok(())
    }
}
