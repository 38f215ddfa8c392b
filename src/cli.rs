//! Interactive menu frontend.
//!
//! The prompts are synchronous (`dialoguer`); catalog calls and downloads run on
//! the tokio runtime through [`Handle::block_on`], so a read-online batch keeps
//! downloading in the background while the user sits in a menu.
//!
//! Every library error is printed and control returns to the previous menu.
//! Only prompt failures (no terminal, closed stdin) end the loop.

use color_eyre::eyre::Result;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::Level;

use crate::{
    Error,
    library::Library,
    types::{Chapter, Manga, SearchParams},
};

const BACK_TO_MAIN: &str = "<< Back to Main Menu";
const BACK: &str = "<< Back";
const NEXT_PAGE: &str = "Next Page >>";

/// Installs the stderr `tracing` subscriber.
///
/// `WARN` by default; `DEBUG` when `MANGAKA_DEBUG` is set.
pub fn init_logging() {
    let level = if std::env::var_os("MANGAKA_DEBUG").is_some() {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub struct Cli {
    library: Library,
    rt: Handle,
    theme: ColorfulTheme,
}

impl Cli {
    pub fn new(library: Library, rt: Handle) -> Self {
        Self {
            library,
            rt,
            theme: ColorfulTheme::default(),
        }
    }

    /// Runs the main menu until the user exits.
    pub fn run(&self) -> Result<()> {
        println!("Welcome to Mangaka! (MangaDex edition)");

        loop {
            let items = ["Search Manga", "My Favorites", "Downloads", "Exit"];
            let choice = Select::with_theme(&self.theme)
                .with_prompt("Main Menu")
                .items(&items)
                .default(0)
                .interact_opt()?;

            match choice {
                Some(0) => self.search_flow()?,
                Some(1) => self.favorites_flow()?,
                Some(2) => self.downloads_flow()?,
                _ => {
                    println!("Goodbye!");
                    return Ok(());
                }
            }
        }
    }

    fn search_flow(&self) -> Result<()> {
        let query: String = Input::with_theme(&self.theme)
            .with_prompt("Search for Manga")
            .allow_empty(true)
            .interact_text()?;
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(());
        }

        let mut offset = 0;
        loop {
            let params = SearchParams {
                query: query.clone(),
                offset,
            };
            let page = match self.spin("Searching...", self.library.source().search(params)) {
                Ok(page) => page,
                Err(e) => {
                    report(&e);
                    return Ok(());
                }
            };

            if page.manga.is_empty() {
                println!("No results found.");
                return Ok(());
            }

            let mut items: Vec<String> = page.manga.iter().map(|m| m.title.clone()).collect();
            if page.has_next() {
                items.push(NEXT_PAGE.to_string());
            }
            items.push(BACK_TO_MAIN.to_string());

            let choice = Select::with_theme(&self.theme)
                .with_prompt(format!("Results for '{}'", query))
                .items(&items)
                .default(0)
                .max_length(12)
                .interact_opt()?;

            match choice {
                Some(i) if i < page.manga.len() => self.manga_flow(&page.manga[i])?,
                Some(i) if items[i] == NEXT_PAGE => offset = page.next_offset(),
                _ => return Ok(()),
            }
        }
    }

    fn manga_flow(&self, manga: &Manga) -> Result<()> {
        print_details(manga);

        loop {
            let fav_label = if self.library.favorites().contains(&manga.id) {
                "Remove from Favorites"
            } else {
                "Add to Favorites"
            };
            let items = ["List Chapters", fav_label, "<< Back to Results"];

            let choice = Select::with_theme(&self.theme)
                .with_prompt(format!("Manga: {}", manga.title))
                .items(&items)
                .default(0)
                .interact_opt()?;

            match choice {
                Some(0) => self.chapters_flow(manga)?,
                Some(1) => match self.library.toggle_favorite(manga) {
                    Ok(true) => println!("Added to favorites."),
                    Ok(false) => println!("Removed from favorites."),
                    Err(e) => report(&e),
                },
                _ => return Ok(()),
            }
        }
    }

    fn chapters_flow(&self, manga: &Manga) -> Result<()> {
        let chapters = match self.spin(
            "Fetching chapters...",
            self.library.source().get_chapters(&manga.id),
        ) {
            Ok(chapters) => chapters,
            Err(e) => {
                report(&e);
                return Ok(());
            }
        };

        if chapters.is_empty() {
            println!("No chapters found.");
            return Ok(());
        }

        let mut items: Vec<String> = chapters
            .iter()
            .map(|ch| {
                if ch.is_external() {
                    format!("{} [External]", ch.title)
                } else {
                    ch.title.clone()
                }
            })
            .collect();
        items.push(BACK.to_string());

        loop {
            let choice = Select::with_theme(&self.theme)
                .with_prompt("Select Chapter")
                .items(&items)
                .default(0)
                .max_length(15)
                .interact_opt()?;

            match choice {
                Some(i) if i < chapters.len() => self.chapter_flow(manga, &chapters[i])?,
                _ => return Ok(()),
            }
        }
    }

    fn chapter_flow(&self, manga: &Manga, chapter: &Chapter) -> Result<()> {
        if let Some(url) = &chapter.external_url {
            println!("This chapter is hosted externally. Please open in browser:\n{}", url);
            return Ok(());
        }

        let items = ["Read Online", "Download to Library", BACK];
        let choice = Select::with_theme(&self.theme)
            .with_prompt(chapter.title.as_str())
            .items(&items)
            .default(0)
            .interact_opt()?;

        match choice {
            Some(0) => {
                let result = self.spin(
                    &format!("Opening '{}'...", chapter.title),
                    self.library.read_online(chapter),
                );
                match result {
                    Ok(session) => println!(
                        "Opened first page. Remaining pages are loading into {}",
                        session.dir.display()
                    ),
                    Err(e) => report(&e),
                }
            }
            Some(1) => {
                let result = self.spin(
                    &format!("Downloading '{}'...", chapter.title),
                    self.library.download(&manga.title, chapter),
                );
                match result {
                    Ok(path) => println!("Saved to {}", path.display()),
                    Err(e) => report(&e),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn favorites_flow(&self) -> Result<()> {
        let favs = self.library.favorites().list();
        if favs.is_empty() {
            println!("No favorites yet.");
            return Ok(());
        }

        let mut items: Vec<String> = favs.iter().map(|f| f.title.clone()).collect();
        items.push(BACK_TO_MAIN.to_string());

        let choice = Select::with_theme(&self.theme)
            .with_prompt("My Favorites")
            .items(&items)
            .default(0)
            .interact_opt()?;

        match choice {
            Some(i) if i < favs.len() => self.manga_flow(&Manga::from_favorite(&favs[i])),
            _ => Ok(()),
        }
    }

    fn downloads_flow(&self) -> Result<()> {
        let downloads = match self.library.downloads() {
            Ok(items) => items,
            Err(e) => {
                report(&e);
                return Ok(());
            }
        };
        if downloads.is_empty() {
            println!(
                "No downloads yet. Archives are saved under {}",
                self.library.config().library_dir.display()
            );
            return Ok(());
        }

        let mut items: Vec<String> = downloads
            .iter()
            .map(|item| match item.pages {
                Some(pages) => format!("{} / {} ({} pages)", item.manga, item.chapter, pages),
                None => format!("{} / {} (unreadable)", item.manga, item.chapter),
            })
            .collect();
        items.push(BACK_TO_MAIN.to_string());

        let choice = Select::with_theme(&self.theme)
            .with_prompt("Downloads")
            .items(&items)
            .default(0)
            .max_length(15)
            .interact_opt()?;

        if let Some(i) = choice.filter(|&i| i < downloads.len()) {
            if let Err(e) = self.library.open(&downloads[i].path) {
                report(&e);
            }
        }
        Ok(())
    }

    /// Drives `fut` to completion on the runtime while showing a spinner.
    fn spin<F: Future>(&self, message: &str, fut: F) -> F::Output {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        let output = self.rt.block_on(fut);
        spinner.finish_and_clear();
        output
    }
}

fn print_details(manga: &Manga) {
    println!();
    println!("{}", manga.title);
    let mut meta = Vec::new();
    if !manga.status.is_empty() {
        meta.push(manga.status.clone());
    }
    if let Some(year) = manga.year {
        meta.push(year.to_string());
    }
    if !meta.is_empty() {
        println!("{}", meta.join(" · "));
    }
    if let Some(description) = &manga.description {
        let short: String = description.chars().take(400).collect();
        if short.len() < description.len() {
            println!("{}...", short.trim_end());
        } else {
            println!("{}", short);
        }
    }
    println!();
}

fn report(error: &Error) {
    if error.is_benign() {
        println!("{}", error);
    } else {
        println!("Error: {}", error);
    }
}
