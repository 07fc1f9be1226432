use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use hashbrown::HashMap;
use regex::Regex;
use tracing::debug;

use crate::errors::{IoError, ParseError};
use crate::utils::{csv_files_in, read_file};

/* The sections of an activity statement we care about */
#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
pub enum Category {
    Instruments,
    Trades,
    CorporateActions,
    Dividends,
    MoneyMoves,
    OpenPositions,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Instruments,
        Category::Trades,
        Category::CorporateActions,
        Category::Dividends,
        Category::MoneyMoves,
        Category::OpenPositions,
    ];

    fn pattern(&self) -> &'static str {
        match self {
            Category::Instruments => r"^Financial Instrument Information,Data,Stocks",
            Category::Trades => r"^Trades,Data,Order,Stocks",
            Category::CorporateActions => r"^Corporate Actions,Data,Stocks",
            Category::Dividends => r"^Dividends,Data,[A-Z]{3}",
            Category::MoneyMoves => r"^Deposits & Withdrawals,Data,[A-Z]{3}",
            Category::OpenPositions => r"^(Long )?Open Positions,Data,Summary,Stocks",
        }
    }
}

/* Collects the relevant lines of all statement files, grouped by category.
Files are read in filename order so that monthly exports concatenate chronologically. */
#[derive(Debug)]
pub struct StatementReader {
    files: Vec<PathBuf>,
    lines: HashMap<Category, Vec<String>>,
}

impl StatementReader {
    pub fn from_dir(dir: &str) -> Result<Self, IoError> {
        let files = csv_files_in(Path::new(dir))?;
        if files.is_empty() {
            return Err(IoError::new(format!("Not any matching files found: {dir}")));
        }
        Self::from_files(files, &Category::ALL)
    }

    pub fn from_files(mut files: Vec<PathBuf>, categories: &[Category]) -> Result<Self, IoError> {
        files.sort();
        let mut reader = StatementReader {
            files: Vec::new(),
            lines: HashMap::new(),
        };
        let patterns = Self::patterns(categories)?;
        for file in &files {
            debug!("In file {}", file.display());
            let content = read_file(file)?;
            reader.collect(&content, &patterns);
        }
        reader.files = files;
        Ok(reader)
    }

    /* Statement content already in memory */
    pub fn from_content(content: &str) -> Result<Self, IoError> {
        let mut reader = StatementReader {
            files: Vec::new(),
            lines: HashMap::new(),
        };
        let patterns = Self::patterns(&Category::ALL)?;
        reader.collect(content, &patterns);
        Ok(reader)
    }

    fn patterns(categories: &[Category]) -> Result<Vec<(Category, Regex)>, IoError> {
        categories
            .iter()
            .map(|c| {
                Regex::new(c.pattern())
                    .map(|r| (*c, r))
                    .map_err(|e| IoError::new(e.to_string()))
            })
            .collect()
    }

    fn collect(&mut self, content: &str, patterns: &[(Category, Regex)]) {
        for line in content.lines() {
            let line = line.trim_start_matches('\u{feff}');
            for (category, pattern) in patterns {
                if pattern.is_match(line) {
                    self.lines
                        .entry(*category)
                        .or_default()
                        .push(line.to_string());
                }
            }
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn lines(&self, category: Category) -> &[String] {
        self.lines
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /* Lines of a category split into fields. Errors stay attached to their line. */
    pub fn rows(&self, category: Category) -> Vec<Result<Vec<String>, ParseError>> {
        self.lines(category).iter().map(|l| split_line(l)).collect()
    }
}

/* Split a single csv line, honoring quotes: "2019-06-16, 20:09:34" stays one field */
pub fn split_line(line: &str) -> Result<Vec<String>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(str::to_string).collect()),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = r#"Statement,Data,Title,Activity Statement
Trades,Header,DataDiscriminator,Asset Category,Currency,Symbol,Date/Time,Quantity
Trades,Data,Order,Stocks,AUD,AEF,"2019-06-16, 20:09:34",500,1.85,1.775,-925,-6,931,0,0,-37.5,O
Dividends,Data,USD,2020-02-13,AAPL(US0378331005) Cash Dividend USD 0.77 per Share (Ordinary Dividend),7.7
Dividends,Data,Total,,,7.7
Deposits & Withdrawals,Data,EUR,2020-01-02,Electronic Fund Transfer,1000
Corporate Actions,Data,Stocks,USD,2020-08-31,"2020-08-28, 20:25:00","AAPL(US0378331005) Split 4 for 1 (AAPL, APPLE INC, US0378331005)",30,0,0,0,
Financial Instrument Information,Data,Stocks,ROP,ROPER TECHNOLOGIES INC,81025075,US7766961061,NYSE,1,COMMON,
Long Open Positions,Data,Summary,Stocks,USD,AAPL,40,1,100,4000,4400,400,
"#;

    #[test]
    fn test_lines_grouped_by_category() {
        let reader = StatementReader::from_content(STATEMENT).unwrap();
        assert_eq!(reader.lines(Category::Trades).len(), 1);
        assert_eq!(reader.lines(Category::Dividends).len(), 1);
        assert_eq!(reader.lines(Category::MoneyMoves).len(), 1);
        assert_eq!(reader.lines(Category::CorporateActions).len(), 1);
        assert_eq!(reader.lines(Category::Instruments).len(), 1);
        assert_eq!(reader.lines(Category::OpenPositions).len(), 1);
    }

    #[test]
    fn test_split_quoted_line() {
        let reader = StatementReader::from_content(STATEMENT).unwrap();
        let rows = reader.rows(Category::Trades);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.len(), 17);
        assert_eq!(row[6], "2019-06-16, 20:09:34");
    }
}
