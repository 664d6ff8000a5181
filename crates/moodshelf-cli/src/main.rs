use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use moodshelf_core::{
    AppConfig, Database, ExitCode, FanficRating, LibraryFilterState, LibrarySort, MoodTag,
    MoodshelfError, ReadableItem, ReadableKind, ReadableStatus, ReadableType, SuggestionContext,
    run_suggestion_engine, suggest,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "moodshelf",
    about = "Reading queue for books and fan works, with mood-based suggestions",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting MOODSHELF_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List readables, optionally through filters or a smart shelf.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Resolve a smart shelf (id or name) instead of the flags above.
        #[arg(long, conflicts_with_all = ["status", "kind", "mood", "query", "min_priority"])]
        shelf: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show one readable.
    Show { id: String },

    /// Add a book or fan work to the queue.
    Add {
        #[command(subcommand)]
        kind: AddKind,
    },

    /// Record reading progress or change status.
    Progress {
        id: String,
        #[arg(long, conflicts_with_all = ["page", "percent"])]
        chapter: Option<u32>,
        #[arg(long, conflicts_with = "percent")]
        page: Option<u32>,
        #[arg(long)]
        percent: Option<f64>,
        #[arg(long)]
        status: Option<ReadableStatus>,
    },

    /// Delete a readable.
    Delete {
        id: String,
        #[arg(long)]
        confirm: bool,
    },

    /// Pick something to read for the given moods.
    Suggest {
        #[arg(long, action = clap::ArgAction::Append)]
        mood: Vec<MoodTag>,
        #[arg(long)]
        no_books: bool,
        #[arg(long)]
        no_fanfic: bool,
        #[arg(long)]
        min_words: Option<u64>,
        #[arg(long)]
        max_words: Option<u64>,
        /// Consider finished and dropped items too.
        #[arg(long)]
        all: bool,
        /// Seed the draw for a reproducible pick.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Smart shelf management.
    Shelf {
        #[command(subcommand)]
        action: ShelfAction,
    },

    /// Show queue statistics.
    Stats,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, action = clap::ArgAction::Append)]
    status: Vec<ReadableStatus>,
    #[arg(long = "type", id = "kind", action = clap::ArgAction::Append)]
    kind: Vec<ReadableType>,
    #[arg(long, action = clap::ArgAction::Append)]
    mood: Vec<MoodTag>,
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    min_priority: Option<u8>,
    #[arg(long)]
    sort: Option<LibrarySort>,
}

impl FilterArgs {
    fn into_filter(self) -> LibraryFilterState {
        LibraryFilterState {
            types: self.kind,
            statuses: self.status,
            mood_tags: self.mood,
            query: self.query,
            min_priority: self.min_priority,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

// ─── Add Actions ────────────────────────────────────────────────────────────

#[derive(Args)]
struct CommonAddArgs {
    title: String,
    #[arg(long, default_value = "")]
    author: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    priority: Option<u8>,
    #[arg(long, action = clap::ArgAction::Append)]
    mood: Vec<MoodTag>,
}

#[derive(Subcommand)]
enum AddKind {
    /// Add a book.
    Book {
        #[command(flatten)]
        common: CommonAddArgs,
        #[arg(long)]
        pages: Option<u32>,
        #[arg(long, action = clap::ArgAction::Append)]
        genre: Vec<String>,
    },

    /// Add a fan work.
    Fanfic {
        #[command(flatten)]
        common: CommonAddArgs,
        #[arg(long)]
        work_id: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, action = clap::ArgAction::Append)]
        fandom: Vec<String>,
        /// Chapters released so far.
        #[arg(long)]
        chapters: Option<u32>,
        /// Final chapter count, when known.
        #[arg(long)]
        total_chapters: Option<u32>,
        /// Whether the work is finished; left unknown when omitted.
        #[arg(long)]
        complete: Option<bool>,
        #[arg(long)]
        words: Option<u64>,
        #[arg(long)]
        rating: Option<FanficRating>,
    },
}

// ─── Shelf Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ShelfAction {
    /// List smart shelves.
    List,
    /// Save the given filters as a shelf.
    Create {
        name: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Rename a shelf (id or name).
    Rename { shelf: String, name: String },
    /// Delete a shelf. Readables are not touched.
    Delete {
        shelf: String,
        #[arg(long)]
        confirm: bool,
    },
    /// Show a shelf's filter and contents.
    Show { shelf: String },
}

// ─── Config Actions ─────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective config.
    Show,
    /// Print the config file path.
    Path,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("MOODSHELF_JSON").as_deref() == Ok("1");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => fail(&anyhow::Error::from(e), json_output, start),
    };
    init_tracing(&config);

    if let Err(e) = run(cli.command, &config, json_output, start) {
        fail(&e, json_output, start);
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("MOODSHELF_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(command: Commands, config: &AppConfig, json_output: bool, start: Instant) -> Result<()> {
    match command {
        Commands::List { filter, shelf, limit } => {
            let db = open_db(config)?;
            let items = match shelf {
                Some(shelf) => {
                    let shelf = db.find_shelf(&shelf)?;
                    db.list_readables_for_shelf(&shelf.id)?
                }
                None => filter.into_filter().apply(db.list_all_readables()?),
            };
            let total = items.len();
            let items: Vec<ReadableItem> = items.into_iter().take(limit).collect();
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": items, "total": total, "limit": limit },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if items.is_empty() {
                println!("Nothing here. Use `moodshelf add` to queue something.");
            } else {
                for item in &items {
                    print_item_line(item);
                }
                if total > items.len() {
                    println!("… {} more", total - items.len());
                }
            }
        }

        Commands::Show { id } => {
            let db = open_db(config)?;
            let item = resolve_item(&db, &id)?;
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":item,"meta":{"duration_ms":dur}}))?;
            } else {
                print_item_details(&item);
            }
        }

        Commands::Add { kind } => {
            let item = build_item(kind)?;
            let db = open_db(config)?;
            db.upsert_readable(&item)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":item,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Added: {} ({})", item.title, item.id);
            }
        }

        Commands::Progress { id, chapter, page, percent, status } => {
            let db = open_db(config)?;
            let mut item = resolve_item(&db, &id)?;

            match (chapter, page, item.readable_type()) {
                (Some(_), _, ReadableType::Book) => {
                    return Err(invalid("--chapter applies to fan works; use --page for books"));
                }
                (_, Some(_), ReadableType::Fanfic) => {
                    return Err(invalid("--page applies to books; use --chapter for fan works"));
                }
                (Some(position), _, _) | (_, Some(position), _) => item.record_position(position),
                (None, None, _) => {}
            }
            if let Some(percent) = percent {
                if !(0.0..=100.0).contains(&percent) {
                    return Err(invalid("--percent must be between 0 and 100"));
                }
                item.record_percent(percent);
            }

            let now = Utc::now();
            match status {
                Some(status) => item.set_status(status, now),
                None if item.status == ReadableStatus::ToRead && item.progress_percent > 0.0 => {
                    item.set_status(ReadableStatus::InProgress, now);
                }
                None => {}
            }

            db.upsert_readable(&item)?;
            let item = db.get_readable(&item.id)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":item,"meta":{"duration_ms":dur}}))?;
            } else {
                println!(
                    "{}: {} ({:.0}%)",
                    item.title, item.status, item.progress_percent
                );
            }
        }

        Commands::Delete { id, confirm } => {
            if !confirm {
                eprintln!("Add --confirm to delete without prompt.");
                std::process::exit(ExitCode::ConfirmRequired as i32);
            }
            let db = open_db(config)?;
            let item = resolve_item(&db, &id)?;
            db.delete_readable(&item.id)?;
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"deleted":item.id},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Deleted: {}", item.title);
            }
        }

        // ── Suggest ────────────────────────────────────────────────────────
        Commands::Suggest { mood, no_books, no_fanfic, min_words, max_words, all, seed } => {
            let mut filters = config.suggest.to_filters();
            if no_books {
                filters.include_books = false;
            }
            if no_fanfic {
                filters.include_fanfic = false;
            }
            if min_words.is_some() {
                filters.min_word_count = min_words;
            }
            if max_words.is_some() {
                filters.max_word_count = max_words;
            }
            if let (Some(min), Some(max)) = (filters.min_word_count, filters.max_word_count)
                && min > max
            {
                return Err(invalid("--min-words is greater than --max-words"));
            }

            let db = open_db(config)?;
            let items = if all || !config.suggest.exclude_finished {
                db.list_all_readables()?
            } else {
                db.list_open_readables()?
            };
            let ctx = SuggestionContext { mood_tags: mood, filters };
            debug!(candidates = items.len(), seeded = seed.is_some(), "Running suggestion");

            let result = match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    run_suggestion_engine(&items, &ctx, &mut || rng.random::<f64>())
                }
                None => suggest(&items, &ctx),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":result,"meta":{"duration_ms":dur}}))?;
            } else {
                match result {
                    Some(result) => {
                        println!("Try: {} by {}", result.item.title, display_author(&result.item));
                        println!("  {}", result.reason);
                        println!("  score {}  id {}", result.score, result.item.id);
                    }
                    None => println!("Nothing in the queue matches those filters."),
                }
            }
        }

        // ── Shelves ────────────────────────────────────────────────────────
        Commands::Shelf { action } => match action {
            ShelfAction::List => {
                let db = open_db(config)?;
                let shelves = db.list_shelves()?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":shelves,"meta":{"duration_ms":dur}}))?;
                } else if shelves.is_empty() {
                    println!("No shelves.");
                } else {
                    for shelf in &shelves {
                        println!("  {}  {}", short_id(&shelf.id), shelf.name);
                    }
                }
            }
            ShelfAction::Create { name, filter } => {
                let db = open_db(config)?;
                let shelf = db.create_shelf(&name, filter.into_filter())?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":shelf,"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Created shelf '{}' ({}).", shelf.name, short_id(&shelf.id));
                }
            }
            ShelfAction::Rename { shelf, name } => {
                let db = open_db(config)?;
                let shelf = db.find_shelf(&shelf)?;
                let shelf = db.rename_shelf(&shelf.id, &name)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":shelf,"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Renamed shelf to '{}'.", shelf.name);
                }
            }
            ShelfAction::Delete { shelf, confirm } => {
                if !confirm {
                    eprintln!("Add --confirm to delete without prompt.");
                    std::process::exit(ExitCode::ConfirmRequired as i32);
                }
                let db = open_db(config)?;
                let shelf = db.find_shelf(&shelf)?;
                db.delete_shelf(&shelf.id)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"deleted":shelf.id},"meta":{"duration_ms":dur}}))?;
                } else {
                    println!("Deleted shelf: {}", shelf.name);
                }
            }
            ShelfAction::Show { shelf } => {
                let db = open_db(config)?;
                let shelf = db.find_shelf(&shelf)?;
                let items = db.list_readables_for_shelf(&shelf.id)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status":"ok",
                        "data":{"shelf":shelf,"items":items,"total":items.len()},
                        "meta":{"duration_ms":dur}
                    }))?;
                } else {
                    println!("{} ({} items)", shelf.name, items.len());
                    println!("  filter: {}", serde_json::to_string(&shelf.filter)?);
                    for item in &items {
                        print_item_line(item);
                    }
                }
            }
        },

        // ── Stats ──────────────────────────────────────────────────────────
        Commands::Stats => {
            let db = open_db(config)?;
            let stats = db.stats()?;
            let shelves = db.list_shelves()?.len();
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"readables":stats,"shelves":shelves},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                println!("Queue statistics:");
                println!("  Total:       {} ({} books, {} fan works)", stats.total, stats.books, stats.fanfics);
                println!("  To read:     {}", stats.to_read);
                println!("  In progress: {}", stats.in_progress);
                println!("  Finished:    {}", stats.finished);
                println!("  Dropped:     {}", stats.dnf);
                println!("  Shelves:     {shelves}");
            }
        }

        // ── Config ─────────────────────────────────────────────────────────
        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::Show => {
                    if json_output {
                        print_json(&serde_json::json!({
                            "status":"ok",
                            "data":{"config":config,"database_path":config.database_path()},
                            "meta":{"duration_ms":dur}
                        }))?;
                    } else {
                        print!("{}", toml::to_string_pretty(config)?);
                    }
                }
                ConfigAction::Path => {
                    let path = AppConfig::config_path();
                    if json_output {
                        print_json(&serde_json::json!({
                            "status":"ok",
                            "data":{"path":path,"exists":path.exists()},
                            "meta":{"duration_ms":dur}
                        }))?;
                    } else {
                        println!("{}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(config: &AppConfig) -> Result<Database> {
    Ok(Database::open(&config.database_path())?)
}

fn invalid(message: &str) -> anyhow::Error {
    MoodshelfError::ValidationError(message.to_string()).into()
}

/// Reports `err` and exits with the matching code.
fn fail(err: &anyhow::Error, json_output: bool, start: Instant) -> ! {
    let (code, kind) = match err.downcast_ref::<MoodshelfError>() {
        Some(e) if e.is_not_found() => (ExitCode::NotFound, "not_found"),
        Some(e) => match ExitCode::from(e) {
            ExitCode::InvalidArgs => (ExitCode::InvalidArgs, "invalid_args"),
            code => (code, "error"),
        },
        None => (ExitCode::GeneralError, "error"),
    };

    if json_output {
        let envelope = serde_json::json!({
            "status":"error",
            "error":kind,
            "message":err.to_string(),
            "meta":{"duration_ms":start.elapsed().as_millis()}
        });
        println!("{envelope}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(code as i32);
}

/// Looks `id` up exactly, then as a unique id prefix.
fn resolve_item(db: &Database, id: &str) -> Result<ReadableItem> {
    match db.get_readable(id) {
        Ok(item) => Ok(item),
        Err(e) if e.is_not_found() && !id.is_empty() => {
            let mut matches: Vec<ReadableItem> = db
                .list_all_readables()?
                .into_iter()
                .filter(|item| item.id.starts_with(id))
                .collect();
            match matches.len() {
                1 => Ok(matches.remove(0)),
                0 => Err(e.into()),
                n => Err(invalid(&format!("id prefix '{id}' is ambiguous ({n} matches)"))),
            }
        }
        Err(e) => Err(e.into()),
    }
}

fn build_item(kind: AddKind) -> Result<ReadableItem> {
    let (mut item, common) = match kind {
        AddKind::Book { common, pages, genre } => {
            let mut item = ReadableItem::new_book(common.title.trim(), common.author.trim());
            if let ReadableKind::Book(book) = &mut item.kind {
                book.page_count = pages;
                book.genres = genre;
            }
            (item, common)
        }
        AddKind::Fanfic {
            common,
            work_id,
            url,
            fandom,
            chapters,
            total_chapters,
            complete,
            words,
            rating,
        } => {
            let mut item = ReadableItem::new_fanfic(common.title.trim(), common.author.trim());
            if let ReadableKind::Fanfic(fic) = &mut item.kind {
                fic.ao3_work_id = work_id;
                fic.ao3_url = url;
                fic.fandoms = fandom;
                fic.available_chapters = chapters;
                fic.total_chapters = total_chapters;
                fic.complete = complete;
                fic.word_count = words;
                fic.rating = rating;
                if let Some(warning) = fic.chapter_warning() {
                    eprintln!("Warning: {warning}");
                }
            }
            (item, common)
        }
    };

    if item.title.is_empty() {
        return Err(invalid("title must not be blank"));
    }
    item.description = common.description;
    if let Some(priority) = common.priority {
        item.set_priority(priority);
    }
    for mood in common.mood {
        if !item.mood_tags.contains(&mood) {
            item.mood_tags.push(mood);
        }
    }
    Ok(item)
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn display_author(item: &ReadableItem) -> &str {
    if item.author.is_empty() { "unknown author" } else { &item.author }
}

fn print_item_line(item: &ReadableItem) {
    let kind = match item.readable_type() {
        ReadableType::Book => "book",
        ReadableType::Fanfic => "fic ",
    };
    let moods: Vec<&str> = item.mood_tags.iter().map(|m| m.as_str()).collect();
    println!(
        "{id}  {kind}  p{priority}  {status:<11}  {title:<40}  {author:<20}  {moods}",
        id = short_id(&item.id),
        priority = item.priority,
        status = item.status.as_str(),
        title = item.title,
        author = item.author,
        moods = moods.join(","),
    );
}

fn print_item_details(item: &ReadableItem) {
    println!("{} by {}", item.title, display_author(item));
    println!("  id:       {}", item.id);
    println!("  type:     {}  (source {})", item.readable_type(), item.source());
    println!("  status:   {}  {:.0}%", item.status, item.progress_percent);
    println!("  priority: {}", item.priority);
    if !item.mood_tags.is_empty() {
        let moods: Vec<&str> = item.mood_tags.iter().map(|m| m.as_str()).collect();
        println!("  moods:    {}", moods.join(", "));
    }
    if let Some(words) = item.approximate_word_count() {
        println!("  length:   ~{words} words");
    }
    match &item.kind {
        ReadableKind::Book(book) => {
            if let Some(pages) = book.page_count {
                let current = book.current_page.map(|p| format!("{p}/")).unwrap_or_default();
                println!("  pages:    {current}{pages}");
            }
            if !book.genres.is_empty() {
                println!("  genres:   {}", book.genres.join(", "));
            }
        }
        ReadableKind::Fanfic(fic) => {
            if !fic.fandoms.is_empty() {
                println!("  fandoms:  {}", fic.fandoms.join(", "));
            }
            let total = fic.total_chapters.map(|t| t.to_string()).unwrap_or_else(|| "?".to_string());
            let available = fic.available_chapters.map(|a| a.to_string()).unwrap_or_else(|| "?".to_string());
            let current = fic.current_chapter.map(|c| format!("at {c}, ")).unwrap_or_default();
            println!("  chapters: {current}{available}/{total}");
            if let Some(rating) = fic.rating {
                println!("  rating:   {rating}");
            }
            if let Some(url) = &fic.ao3_url {
                println!("  url:      {url}");
            }
        }
    }
    if let Some(description) = &item.description {
        println!("\n{description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_add(args: &[&str]) -> ReadableItem {
        let argv = ["moodshelf", "add"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Add { kind } => build_item(kind).unwrap(),
            _ => panic!("not an add command"),
        }
    }

    #[test]
    fn test_add_fanfic_without_complete_flag_leaves_it_unknown() {
        let item = parse_add(&["fanfic", "Long Fic", "--total-chapters", "9"]);
        let fic = item.as_fanfic().unwrap();
        assert_eq!(fic.complete, None);
        assert_eq!(fic.total_chapters, Some(9));
    }

    #[test]
    fn test_add_fanfic_complete_flag_takes_a_value() {
        let item = parse_add(&["fanfic", "Done Fic", "--chapters", "12", "--complete", "true"]);
        assert_eq!(item.as_fanfic().unwrap().complete, Some(true));

        let item = parse_add(&["fanfic", "Ongoing", "--complete", "false"]);
        assert_eq!(item.as_fanfic().unwrap().complete, Some(false));
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let cli = Cli::try_parse_from(["moodshelf", "add", "book", "   "]).unwrap();
        let Commands::Add { kind } = cli.command else {
            panic!("not an add command");
        };
        assert!(build_item(kind).is_err());
    }
}
