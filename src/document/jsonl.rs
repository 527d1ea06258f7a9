//! Reads articles from JSONL (JSON Lines) files.
//!
//! Each non-empty line is one article object:
//! ```jsonl
//! {"id": "a-1", "title": "Nvidia unveils new GPU", "category": "technology"}
//! {"id": "a-2", "title": "Markets rally", "category": "business"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::document::article::Article;
use crate::error::{NewsfindError, Result};

/// Iterator over the articles in a JSONL stream.
///
/// A malformed line yields an error for that line only; iteration continues
/// with the next one.
pub struct JsonlArticleReader<R> {
    reader: BufReader<R>,
    line_number: usize,
}

impl JsonlArticleReader<File> {
    /// Open a JSONL file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file))
    }
}

impl<R: Read> JsonlArticleReader<R> {
    /// Read articles from any reader.
    pub fn new(reader: R) -> Self {
        JsonlArticleReader {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }
}

impl<R: Read> Iterator for JsonlArticleReader<R> {
    type Item = Result<Article>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(line).map_err(|e| {
                        NewsfindError::other(format!("line {}: {e}", self.line_number))
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Load every well-formed article from a JSONL file, skipping bad lines.
pub fn load_articles<P: AsRef<Path>>(path: P) -> Result<Vec<Article>> {
    let mut articles = Vec::new();
    for article in JsonlArticleReader::open(path)? {
        match article {
            Ok(article) => articles.push(article),
            Err(e) => log::warn!("skipping article: {e}"),
        }
    }
    Ok(articles)
}
