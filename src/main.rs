use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_resolver::{
    CompletionProvider, OpenAiCompatibleProvider, RecipeCore, RecipeManager, ResolverConfig,
    SuggestionCriteria,
};

#[derive(Parser)]
#[command(name = "recipe-resolver")]
#[command(about = "Resolve recipe requests and suggest recipes", long_about = None)]
struct Cli {
    /// Never call the remote completion service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a free-form request to one recipe
    Resolve {
        /// The request, e.g. "how do I make dal makhani"
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Suggest up to five recipes matching the filters
    Suggest {
        /// Ingredient to include (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        #[arg(short, long)]
        cuisine: Option<String>,

        /// Easy, Medium or Hard
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Mild, Medium or Spicy
        #[arg(long)]
        spice: Option<String>,

        /// Cooking method, e.g. Curry or Grilled
        #[arg(long)]
        method: Option<String>,

        /// Vegetarian or Non-Vegetarian
        #[arg(long)]
        diet: Option<String>,

        /// Dietary restriction group, e.g. "Gluten Free" (repeatable)
        #[arg(long = "restriction")]
        restrictions: Vec<String>,

        /// Maximum preparation time in minutes
        #[arg(long)]
        max_minutes: Option<u32>,
    },

    /// Show a recipe by name
    Details {
        #[arg(required = true)]
        name: Vec<String>,
    },
}

fn build_core(offline: bool) -> Result<RecipeCore> {
    let config = ResolverConfig::from_env().context("Invalid configuration")?;

    let provider: Option<Arc<dyn CompletionProvider>> = if offline || !config.remote.is_enabled() {
        None
    } else {
        Some(Arc::new(
            OpenAiCompatibleProvider::new(&config.remote)
                .context("Failed to create completion provider")?,
        ))
    };

    RecipeCore::builtin(config, provider).context("Failed to load recipe dataset")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "recipe_resolver=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let core = Arc::new(build_core(cli.offline)?);
    let mut manager = RecipeManager::new(core);

    match cli.command {
        Commands::Resolve { query } => {
            let query = query.join(" ");
            match manager.resolve(&query).await {
                Some(resolved) => {
                    println!("Source: {}", resolved.source);
                    println!("{}", serde_json::to_string_pretty(resolved.recipe.as_ref())?);
                }
                None => println!("No recipe found for \"{}\"", query),
            }
        }

        Commands::Suggest {
            ingredients,
            cuisine,
            difficulty,
            spice,
            method,
            diet,
            restrictions,
            max_minutes,
        } => {
            let criteria = SuggestionCriteria {
                ingredients,
                cuisine,
                difficulty,
                spice_level: spice,
                cooking_method: method,
                diet,
                restrictions,
                max_minutes,
            };
            let suggestions = manager.suggest(&criteria);
            if suggestions.is_empty() {
                println!("No recipes match these filters.");
            }
            for (rank, summary) in suggestions.iter().enumerate() {
                println!(
                    "{}. {} [{:.1}] - {}, {}, {} min",
                    rank + 1,
                    summary.name,
                    summary.score,
                    summary.cuisine,
                    summary.difficulty,
                    summary.time
                );
                if !summary.description.is_empty() {
                    println!("   {}", summary.description);
                }
            }
        }

        Commands::Details { name } => {
            let name = name.join(" ");
            match manager.get_details(&name).await {
                (Some(recipe), local) => {
                    println!("Source: {}", if local { "local/cache" } else { "remote" });
                    println!("{}", serde_json::to_string_pretty(recipe.as_ref())?);
                }
                (None, _) => println!("No recipe named \"{}\"", name),
            }
        }
    }

    Ok(())
}
