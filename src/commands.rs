use anyhow::Context;
use serde::Serialize;
use serde_json::json;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use nutritrack::error::ValidationError;
use nutritrack::foods::Food;
use nutritrack::images::ImageUpload;
use nutritrack::meals::dto::format_date;
use nutritrack::meals::{entry_totals, meal_totals, Meal, MealType, NutrientTotals};
use nutritrack::screens::{
    AddMealScreen, DashboardScreen, LoginScreen, ProfileScreen, RegisterScreen, ScreenError,
};
use nutritrack::state::AppState;
use nutritrack::users::UserProfile;

use crate::cli::{
    AddMealArgs, Cli, Commands, DashboardArgs, FoodArg, FoodsCommands, HistoryArgs,
    ProfileCommands,
};

pub async fn run(cli: Cli, state: &AppState) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Register(a) => {
            let mut screen = RegisterScreen::new(state);
            screen
                .register(&a.username, &a.email, &a.password, a.full_name.as_deref())
                .await?;
            println!("Registered and signed in as {}", a.username.trim());
        }
        Commands::Login(a) => {
            let mut screen = LoginScreen::new(state);
            screen.login(&a.username, &a.password).await?;
            if let Some(session) = screen.session() {
                println!("Signed in as {}", session.username);
            }
        }
        Commands::Logout => {
            LoginScreen::new(state).logout()?;
            println!("Signed out");
        }
        Commands::Dashboard(a) => dashboard(state, a, json).await?,
        Commands::History(a) => history(state, a, json).await?,
        Commands::Meal { id } => {
            let mut screen = DashboardScreen::new(state, today());
            screen.open_meal(id).await?;
            if let Some(meal) = screen.selected() {
                if json {
                    print_json(&json!({"meal": meal, "totals": meal_totals(meal)}))?;
                } else {
                    println!("{}", format_date(meal.meal_date));
                    print_meal(meal, &meal_totals(meal));
                }
            }
        }
        Commands::Foods(FoodsCommands::Search { name }) => {
            let mut screen = AddMealScreen::new(state, MealType::Snack, today());
            screen.search(&name).await?;
            print_foods(screen.results(), json)?;
        }
        Commands::Foods(FoodsCommands::Barcode { code }) => {
            let mut screen = AddMealScreen::new(state, MealType::Snack, today());
            screen.scan_barcode(&code).await?;
            print_foods(screen.results(), json)?;
        }
        Commands::Foods(FoodsCommands::Show { id }) => {
            let mut screen = AddMealScreen::new(state, MealType::Snack, today());
            screen.open_food(id).await?;
            print_foods(screen.results(), json)?;
        }
        Commands::Foods(FoodsCommands::Create(a)) => {
            let mut screen = AddMealScreen::new(state, MealType::Snack, today());
            screen.create_food(a.into()).await?;
            print_foods(screen.results(), json)?;
        }
        Commands::Analyze(a) => {
            let image = ImageUpload::from_path(&a.image)?;
            let mut screen = AddMealScreen::new(state, MealType::Snack, today());
            screen.analyze_image(&image).await?;
            if json {
                print_json(&screen.recognized())?;
            } else if screen.recognized().is_empty() {
                println!("No food recognized in {}", a.image.display());
            } else {
                for (i, c) in screen.recognized().iter().enumerate() {
                    match c.estimated_portion {
                        Some(p) => println!("{:>2}. {} ~ {} {}", i + 1, c.food_name, p, c.portion_unit),
                        None => println!("{:>2}. {} (no portion estimate)", i + 1, c.food_name),
                    }
                }
            }
        }
        Commands::AddMeal(a) => add_meal(state, a, json).await?,
        Commands::Profile(cmd) => profile(state, cmd, json).await?,
    }
    Ok(())
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fmt_totals(t: &NutrientTotals) -> String {
    let r = t.rounded();
    format!(
        "{} kcal | P {:.1} g | C {:.1} g | F {:.1} g | fiber {:.1} g | sodium {} mg",
        r.calories, r.protein, r.carbohydrates, r.fat, r.fiber, r.sodium
    )
}

fn print_foods(foods: &[Food], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(foods);
    }
    if foods.is_empty() {
        println!("No foods found");
    }
    for (i, f) in foods.iter().enumerate() {
        let brand = f.brand.as_deref().map(|b| format!(" ({b})")).unwrap_or_default();
        println!(
            "{:>2}. #{} {}{} per 100 g: {}",
            i + 1,
            f.id,
            f.name,
            brand,
            fmt_totals(&NutrientTotals::of_food(f, 1.0))
        );
    }
    Ok(())
}

async fn dashboard(state: &AppState, args: DashboardArgs, json: bool) -> anyhow::Result<()> {
    let date = args.date.unwrap_or_else(today);
    let mut screen = DashboardScreen::new(state, date);
    screen.load(date).await?;
    if let Some(id) = args.delete {
        screen.delete(id).await?;
        info!(meal_id = id, "deleted");
    }

    if json {
        let goal = screen.goal_progress().map(|g| {
            json!({"goal": g.goal, "consumed": g.consumed, "remaining": g.remaining, "percent": g.percent})
        });
        return print_json(&json!({
            "date": format_date(date),
            "meals": screen.meals(),
            "totals": screen.totals(),
            "goal": goal,
        }));
    }

    println!("{}", format_date(date));
    if screen.meals().is_empty() {
        println!("  no meals logged");
    }
    for (meal, totals) in screen.meals().iter().zip(&screen.totals().meals) {
        print_meal(meal, &totals.totals);
    }
    println!("\nDay total: {}", fmt_totals(&screen.totals().day));
    if let Some(g) = screen.goal_progress() {
        println!(
            "Goal: {} kcal, {:.0}% eaten, {:.0} kcal left",
            g.goal, g.percent, g.remaining
        );
    }
    Ok(())
}

fn print_meal(meal: &Meal, totals: &NutrientTotals) {
    println!("\n{} (#{})", meal.meal_type.label(), meal.id);
    if let Some(notes) = meal.notes.as_deref().filter(|n| !n.is_empty()) {
        println!("  {notes}");
    }
    for line in &meal.meal_foods {
        println!(
            "  - {} {}{}: {}",
            line.display_name(),
            line.quantity.map(|q| q.to_string()).unwrap_or_default(),
            line.quantity_unit.as_deref().unwrap_or(""),
            fmt_totals(&entry_totals(line))
        );
    }
    println!("  = {}", fmt_totals(totals));
}

async fn history(state: &AppState, args: HistoryArgs, json: bool) -> anyhow::Result<()> {
    let mut screen = DashboardScreen::new(state, args.to);
    screen.load_range(args.from, args.to).await?;
    if json {
        let days: Vec<_> = screen
            .history()
            .iter()
            .map(|(d, t)| json!({"date": format_date(*d), "totals": t}))
            .collect();
        return print_json(&days);
    }
    if screen.history().is_empty() {
        println!("No meals between {} and {}", format_date(args.from), format_date(args.to));
    }
    for (day, totals) in screen.history() {
        println!(
            "{}  {} meal(s)  {}",
            format_date(*day),
            totals.meals.len(),
            fmt_totals(&totals.day)
        );
    }
    Ok(())
}

async fn add_meal(state: &AppState, args: AddMealArgs, json: bool) -> anyhow::Result<()> {
    let mut screen = AddMealScreen::new(state, args.meal_type, args.date.unwrap_or_else(today));
    screen.draft.notes = args.notes;

    for item in &args.items {
        screen.search(&item.query).await?;
        add_first(&mut screen, item)
            .with_context(|| format!("adding `{}`", item.query))?;
    }
    for item in &args.barcodes {
        screen.scan_barcode(&item.query).await?;
        add_first(&mut screen, item)
            .with_context(|| format!("adding barcode {}", item.query))?;
    }
    if let Some(path) = &args.image {
        let image = ImageUpload::from_path(path)?;
        screen.analyze_image(&image).await?;
        add_recognized(&mut screen).await?;
    }

    let preview = screen.preview();
    let foods = screen.draft.foods.len();
    let id = screen.submit().await?;
    if json {
        return print_json(&json!({"id": id, "foods": foods, "totals": preview}));
    }
    println!(
        "Logged {} #{} with {} food(s): {}",
        args.meal_type.label(),
        id,
        foods,
        fmt_totals(&preview)
    );
    Ok(())
}

/// Adds the top search result, applying an explicit gram amount if given.
fn add_first(screen: &mut AddMealScreen, item: &FoodArg) -> anyhow::Result<()> {
    if screen.results().is_empty() {
        anyhow::bail!("no food matches `{}`", item.query);
    }
    screen.add_result(0)?;
    if let Some(grams) = item.grams {
        let last = screen.draft.foods.len() - 1;
        screen.update_quantity(last, grams)?;
    }
    Ok(())
}

/// Walks the recognized list, searching each candidate and adding its best
/// match with the estimated portion.
async fn add_recognized(screen: &mut AddMealScreen) -> Result<(), ScreenError> {
    let mut index = 0;
    while index < screen.recognized().len() {
        let name = screen.recognized()[index].food_name.clone();
        screen.search_recognized(index).await?;
        if screen.results().is_empty() {
            warn!(food = %name, "recognized food not in catalog; skipped");
            index += 1;
            continue;
        }
        match screen.add_result(0) {
            // consumed candidates leave the list, so `index` now points at the next one
            Ok(()) => {}
            Err(ScreenError::Invalid(ValidationError::DuplicateFood { .. })) => {
                warn!(food = %name, "already in the meal; skipped");
                index += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

async fn profile(state: &AppState, cmd: ProfileCommands, json: bool) -> anyhow::Result<()> {
    let mut screen = ProfileScreen::new(state);
    match cmd {
        ProfileCommands::Show => {
            screen.load().await?;
            if let Some(p) = screen.profile() {
                print_profile(p, json)?;
            }
        }
        ProfileCommands::Update(a) => {
            screen.save(&a.into()).await?;
            match screen.profile() {
                Some(p) => print_profile(p, json)?,
                None => println!("Nothing to update"),
            }
        }
        ProfileCommands::Recommend => match screen.recommend().await? {
            Some(kcal) if json => print_json(&json!({"recommendedCalories": kcal}))?,
            Some(kcal) => println!("Recommended: {kcal} kcal/day"),
            None => println!(
                "Complete age, weight, height, gender and activity level to get a recommendation"
            ),
        },
    }
    Ok(())
}

fn print_profile(p: &UserProfile, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(p);
    }
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".into());
    println!("Username:       {}", show(p.username.clone()));
    println!("Email:          {}", show(p.email.clone()));
    println!("Full name:      {}", show(p.full_name.clone()));
    println!("Age:            {}", show(p.age.map(|v| v.to_string())));
    println!("Weight (kg):    {}", show(p.weight.map(|v| v.to_string())));
    println!("Height (cm):    {}", show(p.height.map(|v| v.to_string())));
    println!("Gender:         {}", show(p.gender.map(|g| format!("{g:?}"))));
    println!(
        "Activity level: {}",
        show(p.activity_level.map(|a| a.label().to_string()))
    );
    println!(
        "Calorie goal:   {}",
        show(p.daily_calorie_goal.map(|v| format!("{v} kcal")))
    );
    Ok(())
}
