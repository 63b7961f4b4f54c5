use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use time::Date;

use nutritrack::meals::dto::parse_date;
use nutritrack::foods::NewFood;
use nutritrack::meals::MealType;
use nutritrack::users::{ActivityLevel, Gender, ProfileUpdate};

/// Top-level CLI parser for the `nutritrack` binary.
#[derive(Debug, Parser)]
#[command(name = "nutritrack", version, about = "Track meals and nutrition from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Sign in and store the session token.
    Login(LoginArgs),
    /// Forget the stored session token.
    Logout,
    /// Meals and totals for one day.
    Dashboard(DashboardArgs),
    /// Daily totals over a date range.
    History(HistoryArgs),
    /// One logged meal with its foods.
    Meal { id: i64 },
    /// Look up foods.
    #[command(subcommand)]
    Foods(FoodsCommands),
    /// Recognize foods in a photo.
    Analyze(AnalyzeArgs),
    /// Compose and log a meal.
    AddMeal(AddMealArgs),
    /// Show or edit the profile.
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Read from NUTRITRACK_PASSWORD when omitted.
    #[arg(long, env = "NUTRITRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub full_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long, env = "NUTRITRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Day to show, YYYY-MM-DD (default: today, UTC)
    #[arg(long, value_parser = parse_day)]
    pub date: Option<Date>,
    /// Delete this meal before showing the day
    #[arg(long)]
    pub delete: Option<i64>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, value_parser = parse_day)]
    pub from: Date,
    #[arg(long, value_parser = parse_day)]
    pub to: Date,
}

#[derive(Debug, Subcommand)]
pub enum FoodsCommands {
    /// Search the catalog by name.
    Search { name: String },
    /// Look a product up by its 8-14 digit barcode.
    Barcode { code: String },
    /// One catalog food by id.
    Show { id: i64 },
    /// Add a food to the catalog. Amounts are per 100 g.
    Create(FoodCreateArgs),
}

#[derive(Debug, Args)]
pub struct FoodCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub calories: f64,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub barcode: Option<String>,
    #[arg(long)]
    pub serving_size: Option<f64>,
    #[arg(long)]
    pub serving_unit: Option<String>,
    /// Grams
    #[arg(long)]
    pub protein: Option<f64>,
    /// Grams
    #[arg(long)]
    pub carbs: Option<f64>,
    /// Grams
    #[arg(long)]
    pub fat: Option<f64>,
    #[arg(long)]
    pub fiber: Option<f64>,
    #[arg(long)]
    pub sugar: Option<f64>,
    /// Milligrams
    #[arg(long)]
    pub sodium: Option<f64>,
    /// Milligrams
    #[arg(long)]
    pub cholesterol: Option<f64>,
}

impl From<FoodCreateArgs> for NewFood {
    fn from(a: FoodCreateArgs) -> Self {
        NewFood {
            brand: a.brand,
            description: a.description,
            barcode: a.barcode,
            serving_size: a.serving_size,
            serving_unit: a.serving_unit,
            protein: a.protein,
            carbohydrates: a.carbs,
            fat: a.fat,
            fiber: a.fiber,
            sugar: a.sugar,
            sodium: a.sodium,
            cholesterol: a.cholesterol,
            ..NewFood::new(a.name, a.calories)
        }
    }
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    pub image: PathBuf,
}

#[derive(Debug, Args)]
pub struct AddMealArgs {
    #[arg(long, default_value = "snack", value_parser = MealType::from_str)]
    pub meal_type: MealType,
    /// YYYY-MM-DD (default: today, UTC)
    #[arg(long, value_parser = parse_day)]
    pub date: Option<Date>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Food to search for, first match is added: `rice` or `rice=180`
    #[arg(long = "item")]
    pub items: Vec<FoodArg>,
    /// Barcode to scan: `3017620422003` or `3017620422003=15`
    #[arg(long = "barcode")]
    pub barcodes: Vec<FoodArg>,
    /// Photo whose recognized foods are searched and added with their estimated portions
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    Show,
    Update(ProfileUpdateArgs),
    /// Recommended daily calories for the stored profile.
    Recommend,
}

#[derive(Debug, Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub age: Option<i32>,
    /// Kilograms
    #[arg(long)]
    pub weight: Option<f64>,
    /// Centimetres
    #[arg(long)]
    pub height: Option<f64>,
    #[arg(long, value_parser = Gender::from_str)]
    pub gender: Option<Gender>,
    /// sedentary, lightly-active, moderately-active, very-active, extremely-active
    #[arg(long, value_parser = ActivityLevel::from_str)]
    pub activity_level: Option<ActivityLevel>,
    #[arg(long)]
    pub calorie_goal: Option<i32>,
}

impl From<ProfileUpdateArgs> for ProfileUpdate {
    fn from(a: ProfileUpdateArgs) -> Self {
        ProfileUpdate {
            full_name: a.full_name,
            age: a.age,
            weight: a.weight,
            height: a.height,
            gender: a.gender,
            activity_level: a.activity_level,
            daily_calorie_goal: a.calorie_goal,
        }
    }
}

/// `query` or `query=grams`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodArg {
    pub query: String,
    pub grams: Option<f64>,
}

impl FromStr for FoodArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (query, grams) = match s.rsplit_once('=') {
            Some((q, g)) => {
                let grams = g
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("`{g}` is not a gram amount"))?;
                (q, Some(grams))
            }
            None => (s, None),
        };
        let query = query.trim();
        if query.is_empty() {
            return Err("food query is empty".into());
        }
        Ok(Self {
            query: query.to_string(),
            grams,
        })
    }
}

fn parse_day(s: &str) -> Result<Date, String> {
    parse_date(s).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
