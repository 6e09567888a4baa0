//! HTML rendering of the article list.
//!
//! One bordered block per record: title heading, author line and a link that
//! opens in a new tab. An empty list renders a "No articles found." notice.
//! Every piece of record text is escaped before it is written, and only
//! `http`/`https` links are made clickable.

use crate::models::{ArticleRecord, SENTINEL_LINK};
use crate::utils::{escape_html, upcase};
use std::fmt::Write;
use url::Url;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Hacker News Article Scraper</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }
        h1 {
            color: #333;
            border-bottom: 1px solid #ddd;
            padding-bottom: 10px;
        }
        .article {
            margin-bottom: 20px;
            padding: 15px;
            border: 1px solid #ddd;
            border-radius: 5px;
        }
        .article h2 {
            margin-top: 0;
        }
        .article p {
            margin: 5px 0;
        }
        .article a {
            color: #0066cc;
            text-decoration: none;
        }
        .article a:hover {
            text-decoration: underline;
        }
        footer {
            color: #888;
            font-size: 0.8em;
        }
    </style>
</head>
<body>
    <h1>Hacker News Articles</h1>
"#;

/// Render the full page.
///
/// * `edition` - `"morning"`, `"afternoon"` or `"evening"`
/// * `generated_at` - local timestamp shown in the footer
pub fn render_page(articles: &[ArticleRecord], edition: &str, generated_at: &str) -> String {
    let mut page = String::from(PAGE_HEAD);

    if articles.is_empty() {
        writeln!(page, "    <p>No articles found.</p>").unwrap();
    } else {
        for article in articles {
            write_article(&mut page, article);
        }
    }

    writeln!(
        page,
        "    <footer>{} edition &middot; generated {}</footer>",
        escape_html(&upcase(edition)),
        escape_html(generated_at)
    )
    .unwrap();
    page.push_str("</body>\n</html>\n");
    page
}

fn write_article(page: &mut String, article: &ArticleRecord) {
    writeln!(page, "    <div class=\"article\">").unwrap();
    writeln!(page, "        <h2>{}</h2>", escape_html(&article.display_title())).unwrap();
    writeln!(
        page,
        "        <p><strong>Author:</strong> {}</p>",
        escape_html(&article.display_author())
    )
    .unwrap();
    writeln!(
        page,
        "        <p><a href=\"{}\" target=\"_blank\">Read Article</a></p>",
        escape_html(href_for(article))
    )
    .unwrap();
    writeln!(page, "    </div>").unwrap();
}

/// The record's link if it is an absolute `http`/`https` URL, `#` otherwise.
fn href_for(article: &ArticleRecord) -> &str {
    match article.link() {
        Some(link)
            if Url::parse(link).is_ok_and(|url| matches!(url.scheme(), "http" | "https")) =>
        {
            link
        }
        _ => SENTINEL_LINK,
    }
}
