use clap::{Args, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use foodlog::{FoodEntry, FoodLog, KeyValueStore, Totals};

use super::OutputFormat;

/// Width of the name column in text listings.
const NAME_WIDTH: usize = 30;

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Log a food item
    Add {
        /// Name of the food
        name: String,

        /// Calories (kcal)
        #[arg(long, short = 'k')]
        calories: u32,

        /// Protein (grams)
        #[arg(long, short)]
        protein: u32,
    },

    /// List logged food items with running totals
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete logged food items
    Delete {
        /// List positions to delete (as shown by `log list`)
        positions: Vec<usize>,

        /// Entry ID (UUID) to delete (can be repeated)
        #[arg(long = "id", value_name = "UUID")]
        ids: Vec<String>,
    },

    /// Show total calories and protein
    Totals {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct ListOutput<'a> {
    entries: &'a [FoodEntry],
    totals: Totals,
}

impl LogCommand {
    pub fn run<S: KeyValueStore>(
        &self,
        log: &mut FoodLog<S>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            LogSubcommand::Add {
                name,
                calories,
                protein,
            } => {
                if name.trim().is_empty() {
                    return Err("Food name cannot be empty".into());
                }

                let entry = log.add(name.trim(), *calories, *protein);
                println!("Logged: {}", entry);
                println!("Total: {}", log.totals());
                Ok(())
            }

            LogSubcommand::List { format } => {
                match format {
                    OutputFormat::Json => {
                        let output = ListOutput {
                            entries: log.entries(),
                            totals: log.totals(),
                        };
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        if log.is_empty() {
                            println!("No food logged");
                            return Ok(());
                        }

                        println!(
                            "{:>3}  {:<width$}  {:>8}  {:>8}",
                            "#",
                            "NAME",
                            "KCAL",
                            "PROTEIN",
                            width = NAME_WIDTH
                        );
                        println!("{}", "-".repeat(NAME_WIDTH + 25));
                        for (position, entry) in log.entries().iter().enumerate() {
                            println!(
                                "{:>3}  {:<width$}  {:>8}  {:>7}g",
                                position,
                                truncate(&entry.name, NAME_WIDTH),
                                entry.calories,
                                entry.protein,
                                width = NAME_WIDTH
                            );
                        }
                        println!("\nTotal: {} ({} item(s))", log.totals(), log.len());
                    }
                }
                Ok(())
            }

            LogSubcommand::Delete { positions, ids } => {
                if positions.is_empty() && ids.is_empty() {
                    return Err("Nothing to delete. Provide positions or --id.".into());
                }

                let targets = resolve_targets(log, positions, ids)?;
                let len = log.len();
                for position in targets.iter().filter(|&&p| p >= len) {
                    println!("Skipped position {} (log has {} item(s))", position, len);
                }

                let removed = log.delete(targets);
                for entry in &removed {
                    println!("Deleted: {}", entry);
                }
                println!("Total: {}", log.totals());
                Ok(())
            }

            LogSubcommand::Totals { format } => {
                let totals = log.totals();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&totals)?);
                    }
                    OutputFormat::Text => {
                        println!("Calories: {} kcal", totals.calories);
                        println!("Protein:  {} g", totals.protein);
                    }
                }
                Ok(())
            }
        }
    }
}

/// Merges explicit positions with the current positions of the given IDs.
fn resolve_targets<S: KeyValueStore>(
    log: &FoodLog<S>,
    positions: &[usize],
    ids: &[String],
) -> Result<Vec<usize>, String> {
    let mut targets = positions.to_vec();
    for id in ids {
        let uuid = Uuid::parse_str(id).map_err(|_| format!("Invalid entry ID: {}", id))?;
        let position = log
            .entries()
            .iter()
            .position(|e| e.id == uuid)
            .ok_or_else(|| format!("Entry not found: {}", id))?;
        targets.push(position);
    }
    Ok(targets)
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let kept: String = name.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        name.to_string()
    }
}
