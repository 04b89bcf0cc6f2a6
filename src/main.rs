use std::path::PathBuf;

use anyhow::bail;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use uuid::Uuid;

mod models;
mod predict;
mod report;
mod store;

use models::Scenario;
use store::ScenarioStore;

#[derive(Parser)]
#[command(name = "cgpa-predictor")]
#[command(about = "Predicts your cumulative GPA after the upcoming term", long_about = None)]
struct Cli {
    /// Scenario store file
    #[arg(long, global = true, default_value = "scenarios.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the new CGPA from current standing and expected performance
    #[command(group(
        ArgGroup::new("persist")
            .args(["save", "update"])
            .multiple(false)
    ))]
    Predict {
        /// Current cumulative GPA, 0-10
        #[arg(long)]
        current_cgpa: String,
        /// Last semester GPA, 0-10 (informational)
        #[arg(long)]
        last_sgpa: Option<String>,
        /// Expected GPA for the upcoming semester, 0-10
        #[arg(long)]
        upcoming_sgpa: String,
        /// Credits completed so far (enables the weighted formula)
        #[arg(long)]
        total_credits: Option<String>,
        /// Credits taken last semester
        #[arg(long)]
        last_sem_credits: Option<String>,
        /// Credits planned for the upcoming semester
        #[arg(long)]
        upcoming_sem_credits: Option<String>,
        /// Save the prediction under this name
        #[arg(long)]
        save: Option<String>,
        /// Re-save an existing scenario in place, keeping its id
        #[arg(long)]
        update: Option<Uuid>,
        /// New name when updating (defaults to the existing name)
        #[arg(long, requires = "update")]
        name: Option<String>,
    },
    /// List saved scenarios, newest first
    List,
    /// Show one saved scenario in full
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// Delete a saved scenario
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Chart the predicted CGPA of every saved scenario
    Compare,
    /// Generate a markdown report over the saved scenarios
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export saved scenarios to a CSV file
    Export {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import scenarios from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut store = ScenarioStore::load(&cli.store);

    match cli.command {
        Commands::Predict {
            current_cgpa,
            last_sgpa,
            upcoming_sgpa,
            total_credits,
            last_sem_credits,
            upcoming_sem_credits,
            save,
            update,
            name,
        } => {
            let raw = predict::RawFields {
                current_cgpa: &current_cgpa,
                last_sgpa: last_sgpa.as_deref(),
                upcoming_sgpa: &upcoming_sgpa,
                total_credits: total_credits.as_deref(),
                last_sem_credits: last_sem_credits.as_deref(),
                upcoming_sem_credits: upcoming_sem_credits.as_deref(),
            };
            let input = match predict::parse_inputs(&raw) {
                Ok(input) => input,
                Err(errors) => {
                    for error in &errors {
                        eprintln!("- {error}");
                    }
                    bail!("{} field(s) failed validation", errors.len());
                }
            };
            let prediction = predict::predict(&input);

            println!("Current CGPA:   {}", predict::format_gpa(input.current_cgpa));
            println!("Expected SGPA:  {}", predict::format_gpa(input.upcoming_sgpa));
            println!("Predicted CGPA: {}", predict::format_gpa(prediction.new_cgpa));
            println!(
                "Change:         {} ({})",
                report::format_signed(prediction.difference),
                prediction.trend
            );
            println!();
            print!(
                "{}",
                report::render_bar_chart(&[
                    ("Current".to_string(), input.current_cgpa),
                    ("Predicted".to_string(), prediction.new_cgpa),
                ])
            );

            if let Some(id) = update {
                let Some(existing) = store.get(&id) else {
                    bail!("no saved scenario with id {id}");
                };
                let name = name.unwrap_or_else(|| existing.name.clone());
                store.upsert(Scenario {
                    id,
                    name: name.clone(),
                    timestamp: models::now_millis(),
                    input,
                    prediction,
                });
                store.save()?;
                println!("\nUpdated scenario \"{name}\" ({id}).");
            } else if let Some(save_name) = save {
                let name = if save_name.trim().is_empty() {
                    format!("Prediction {}", store.len() + 1)
                } else {
                    save_name
                };
                let scenario = Scenario::new(name, input, prediction);
                let id = scenario.id;
                let name = scenario.name.clone();
                store.upsert(scenario);
                store.save()?;
                println!("\nSaved scenario \"{name}\" ({id}).");
            }
        }
        Commands::List => {
            let scenarios = store.sorted_by_recency();
            if scenarios.is_empty() {
                println!("No predictions saved yet.");
                return Ok(());
            }
            println!("Saved predictions:");
            for scenario in scenarios {
                println!(
                    "- {} ({}) {} {} [{}]",
                    scenario.name,
                    scenario.timestamp.format("%b %d %H:%M"),
                    predict::format_gpa(scenario.prediction.new_cgpa),
                    report::format_signed(scenario.prediction.difference),
                    scenario.id
                );
            }
        }
        Commands::Show { id } => {
            let Some(scenario) = store.get(&id) else {
                bail!("no saved scenario with id {id}");
            };
            println!("{}", scenario.name);
            println!("Saved:          {}", scenario.timestamp.format("%Y-%m-%d %H:%M UTC"));
            println!(
                "Current CGPA:   {}",
                predict::format_gpa(scenario.input.current_cgpa)
            );
            println!(
                "Last SGPA:      {}",
                predict::format_gpa(scenario.input.last_sgpa)
            );
            println!(
                "Expected SGPA:  {}",
                predict::format_gpa(scenario.input.upcoming_sgpa)
            );
            if let Some(total) = scenario.input.total_credits {
                println!("Total credits:  {total}");
            }
            if let Some(last) = scenario.input.last_sem_credits {
                println!("Last credits:   {last}");
            }
            if let Some(upcoming) = scenario.input.upcoming_sem_credits {
                println!("Next credits:   {upcoming}");
            }
            println!(
                "Predicted CGPA: {}",
                predict::format_gpa(scenario.prediction.new_cgpa)
            );
            println!(
                "Change:         {} ({})",
                report::format_signed(scenario.prediction.difference),
                scenario.prediction.trend
            );
            println!();
            print!(
                "{}",
                report::render_bar_chart(&[
                    ("Current".to_string(), scenario.input.current_cgpa),
                    ("Predicted".to_string(), scenario.prediction.new_cgpa),
                ])
            );
        }
        Commands::Delete { id } => {
            if !store.delete(&id) {
                bail!("no saved scenario with id {id}");
            }
            store.save()?;
            println!("Deleted scenario {id}.");
        }
        Commands::Compare => {
            let scenarios = store.sorted_by_recency();
            if scenarios.is_empty() {
                println!("No predictions saved yet.");
                return Ok(());
            }
            let entries: Vec<(String, f64)> = scenarios
                .iter()
                .map(|s| (s.name.clone(), s.prediction.new_cgpa))
                .collect();
            print!("{}", report::render_bar_chart(&entries));
        }
        Commands::Report { out } => {
            let scenarios = store.sorted_by_recency();
            let report = report::build_report(&scenarios, Utc::now());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { csv } => {
            let exported = store.export_csv(&csv)?;
            println!("Exported {exported} scenario(s) to {}.", csv.display());
        }
        Commands::Import { csv } => {
            let imported = store.import_csv(&csv)?;
            store.save()?;
            println!("Imported {imported} scenario(s) from {}.", csv.display());
        }
    }

    Ok(())
}
