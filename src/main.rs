//! CLI interface for tripsonality

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tripsonality::guides::{self, GuideTab};
use tripsonality::logging::init_cli_logging;
use tripsonality::{
    export_calendar, extract_locations, normalize, parse_share_link, placeholder_itinerary, share_link, Config,
    ItineraryDay, Mbti, PlannerClient, SummaryContext, TripForm,
};

#[derive(Parser)]
#[command(name = "tripsonality")]
#[command(about = "Plan trips, export itineraries to your calendar")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the planner for a new itinerary
    Plan {
        /// Destination
        #[arg(short, long)]
        location: String,
        /// Trip length in days
        #[arg(short, long)]
        dates: String,
        /// Trip theme
        #[arg(short, long, default_value = "Movie")]
        theme: String,
        /// Interests and dislikes, free text
        #[arg(short, long, default_value = "")]
        interests: String,
        /// Personality type (e.g. INFJ)
        #[arg(long, default_value = "INFJ")]
        mbti: String,
        /// Budget label (500 USD, 1000 USD, 1500 USD, 2000 USD, 2500+ USD)
        #[arg(long, default_value = "1500 USD")]
        budget: String,
        /// Planner endpoint, overrides config
        #[arg(long)]
        planner_url: Option<String>,
        /// Output file for the itinerary JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a raw planner response into a canonical itinerary
    Normalize {
        /// Planner response JSON file
        input: PathBuf,
        #[arg(short, long, default_value = "")]
        theme: String,
        #[arg(short, long, default_value = "")]
        location: String,
    },
    /// Write the itinerary as trip-itinerary.ics
    Export {
        /// Canonical itinerary JSON (defaults to the sample LA trip)
        #[arg(short, long)]
        itinerary: Option<PathBuf>,
        /// First day of the trip (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        start_date: Option<String>,
        /// Directory to write the calendar into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List map markers for the itinerary
    Locations {
        #[arg(short, long)]
        itinerary: Option<PathBuf>,
    },
    /// Print a share link for the itinerary
    Share {
        #[arg(short, long)]
        itinerary: Option<PathBuf>,
        /// Base URL, overrides config
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the itinerary carried by a share link
    Open { link: String },
    /// Browse featured inspiration guides
    Guides {
        /// Filter by location or username
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, itineraries or lists
        #[arg(short, long, default_value = "all")]
        tab: String,
        /// Print the welcome-screen trip ideas instead
        #[arg(long)]
        prompts: bool,
    },
}

fn load_itinerary(path: Option<&Path>) -> anyhow::Result<Vec<ItineraryDay>> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let days = serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
            Ok(days)
        }
        None => Ok(placeholder_itinerary()),
    }
}

fn parse_start_date(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .with_context(|| format!("invalid start date {:?}, expected YYYY-MM-DD", value)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_logging(cli.verbose)?;

    let mut config = Config::load()?;

    match cli.command {
        Commands::Plan {
            location,
            dates,
            theme,
            interests,
            mbti,
            budget,
            planner_url,
            output,
        } => {
            if let Some(url) = planner_url {
                config.planner_url = url;
            }

            let form = TripForm {
                theme,
                location,
                dates,
                interests,
                mbti: mbti.parse::<Mbti>()?,
                budget,
            };

            eprintln!("Planning your trip...");
            let client = PlannerClient::new(&config)?;
            let days = client.plan(&form).await?;
            if days.is_empty() {
                bail!("The planner did not return an itinerary");
            }

            let json = serde_json::to_string_pretty(&days)?;
            if let Some(output_file) = output {
                fs::write(&output_file, &json)?;
                eprintln!("Itinerary saved to {}", output_file.display());
            } else {
                println!("{}", json);
            }
            eprintln!("Planned {} days", days.len());
        }
        Commands::Normalize { input, theme, location } => {
            let contents = fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&contents)?;
            let days = normalize(&payload, &SummaryContext::new(&theme, &location));
            if days.is_empty() {
                bail!("{} does not contain an itinerary", input.display());
            }
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        Commands::Export {
            itinerary,
            start_date,
            out_dir,
        } => {
            let days = load_itinerary(itinerary.as_deref())?;
            let start = parse_start_date(start_date.as_deref())?;
            let export = export_calendar(&days, start)?;
            let path = export.write_to(&out_dir)?;
            println!("Calendar saved to {}", path.display());
        }
        Commands::Locations { itinerary } => {
            let days = load_itinerary(itinerary.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&extract_locations(&days))?);
        }
        Commands::Share { itinerary, base_url } => {
            let days = load_itinerary(itinerary.as_deref())?;
            let base_url = base_url.unwrap_or(config.share_base_url);
            println!("{}", share_link(&base_url, &days)?);
        }
        Commands::Open { link } => {
            let days = parse_share_link(&link)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
        Commands::Guides { prompts: true, .. } => {
            for prompt in guides::WELCOME_PROMPTS {
                println!("{}", prompt);
            }
        }
        Commands::Guides { search, tab, .. } => {
            let tab = tab.parse::<GuideTab>()?;
            for guide in guides::search(&search, tab) {
                println!("{} [{}] {} by @{}", guide.title, guide.badge(), guide.place_line(), guide.author_username);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "tripsonality",
            "plan",
            "--location",
            "Tokyo",
            "--dates",
            "4",
            "--mbti",
            "ENTP",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli {
            command: Commands::Plan {
                location, dates, theme, mbti, ..
            },
            ..
        }) = cli
        {
            assert_eq!(location, "Tokyo");
            assert_eq!(dates, "4");
            assert_eq!(theme, "Movie");
            assert_eq!(mbti, "ENTP");
        }
    }

    #[test]
    fn test_plan_requires_location() {
        assert!(Cli::try_parse_from(["tripsonality", "plan", "--dates", "3"]).is_err());
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::try_parse_from(["tripsonality", "export", "--start-date", "2025-06-01"]).unwrap();
        match cli.command {
            Commands::Export {
                itinerary,
                start_date,
                out_dir,
            } => {
                assert!(itinerary.is_none());
                assert_eq!(start_date.as_deref(), Some("2025-06-01"));
                assert_eq!(out_dir, PathBuf::from("."));
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_guides_prompts_flag() {
        let cli = Cli::try_parse_from(["tripsonality", "guides", "--prompts"]).unwrap();
        match cli.command {
            Commands::Guides { search, tab, prompts } => {
                assert!(prompts);
                assert_eq!(search, "");
                assert_eq!(tab, "all");
            }
            _ => panic!("expected guides command"),
        }

        let cli = Cli::try_parse_from(["tripsonality", "guides", "-s", "paris"]).unwrap();
        assert!(matches!(cli.command, Commands::Guides { prompts: false, .. }));
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(
            parse_start_date(Some("2025-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert!(parse_start_date(Some("06/01/2025")).is_err());
    }

    #[test]
    fn test_load_itinerary_defaults_to_placeholder() {
        assert_eq!(load_itinerary(None).unwrap().len(), 6);
    }
}
