use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};

use crate::{
    constants::quotes::{ALL_CATEGORIES, QUOTES_PER_PAGE},
    models::quotes::{Origin, Quote},
    sync::SyncReport,
};

pub fn format_quote(quote: &Quote) -> String {
    format!("\"{}\" - *{}*", quote.text, quote.category)
}

pub fn quote_embed(quote: &Quote) -> CreateEmbed {
    let origin = match quote.origin {
        Origin::Local => "local",
        Origin::Remote => "synced",
    };

    CreateEmbed::default()
        .description(format!("\"{}\"", quote.text))
        .field("category", &quote.category, true)
        .footer(CreateEmbedFooter::new(format!("{origin} #{}", quote.id)))
}

pub fn category_label(label: &str) -> &str {
    if label == ALL_CATEGORIES {
        "All Categories"
    } else {
        label
    }
}

pub fn sync_summary(report: &SyncReport) -> String {
    format!(
        "fetched {}, added {}, updated {}. {} quotes stored.",
        report.fetched, report.added, report.replaced, report.total
    )
}

/// numbered list entries, `QUOTES_PER_PAGE` to a page.
pub fn list_pages(quotes: &[&Quote]) -> Vec<String> {
    let mut pages: Vec<String> = vec![];

    for (page, chunk) in quotes.chunks(QUOTES_PER_PAGE).enumerate() {
        let mut quote_list_str = String::new();

        for (idx, quote) in chunk.iter().enumerate() {
            quote_list_str += &format!(
                "{}. {}\n",
                idx + 1 + page * QUOTES_PER_PAGE,
                format_quote(quote)
            );
        }

        pages.push(quote_list_str);
    }

    pages
}
