//! CSV file data adapter.
//!
//! Columns are located by header name, so column order does not matter.
//! Each column accepts its canonical name or the label used by the reporting
//! exports, compared case-insensitively.

use crate::domain::config::{market_for_label, ReportConfig};
use crate::domain::error::ReportError;
use crate::domain::record::{
    is_missing, Channel, CustomerType, Gender, GrossMarginRecord, MarketCode, SessionRecord,
    SpendRecord, TransactionRecord,
};
use crate::ports::data_port::ReportDataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

struct Column {
    name: &'static str,
    labels: &'static [&'static str],
    required: bool,
}

const fn col(name: &'static str, labels: &'static [&'static str], required: bool) -> Column {
    Column { name, labels, required }
}

const TRANSACTION_COLUMNS: &[Column] = &[
    col("date", &["Date"], true),
    col("channel", &["Sales Channel"], true),
    col("order_id", &["Order No"], true),
    col("customer_id", &["Customer E-mail"], true),
    col("customer_type", &["New/Returning Customer"], true),
    col("market", &["Country"], true),
    col("gender", &["Gender"], false),
    col("category", &["Product Category"], false),
    col("product", &["Product"], false),
    col("color", &["Color"], false),
    col("gross_revenue", &["Gross Revenue"], true),
    col("returns", &["Returns"], true),
    col("qty", &["Sales Qty"], true),
];

const SESSION_COLUMNS: &[Column] = &[
    col("date", &["Day"], true),
    col("market", &["Session country"], false),
    col("sessions", &["Sessions"], true),
];

const SPEND_COLUMNS: &[Column] = &[
    col("date", &["Day"], true),
    col("market", &["Market"], true),
    col("total_spend", &["Total Spend"], true),
];

const GROSS_MARGIN_COLUMNS: &[Column] = &[
    col("iso_year", &["Year"], false),
    col("iso_week", &["Week"], false),
    col("week_label", &["Weeks"], false),
    col("gm2", &["GM2", "Gross margin 2 - Dema MTA"], true),
];

/// Header positions for one table.
struct HeaderIndex {
    table: &'static str,
    positions: HashMap<&'static str, usize>,
}

impl HeaderIndex {
    /// Fails with every missing required column at once.
    fn new(
        table: &'static str,
        headers: &StringRecord,
        columns: &[Column],
    ) -> Result<Self, ReportError> {
        let mut positions = HashMap::new();
        let mut missing = Vec::new();
        for column in columns {
            let found = headers.iter().position(|h| {
                let h = h.trim();
                h.eq_ignore_ascii_case(column.name)
                    || column.labels.iter().any(|l| h.eq_ignore_ascii_case(l))
            });
            match found {
                Some(i) => {
                    positions.insert(column.name, i);
                }
                None if column.required => missing.push(column.name.to_string()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(ReportError::MissingColumns {
                table: table.to_string(),
                columns: missing,
            });
        }
        Ok(Self { table, positions })
    }

    fn has(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Trimmed cell; empty when the column is absent.
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.positions
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    /// `None` for empty cells and the `-` placeholder.
    fn optional(&self, record: &StringRecord, name: &str) -> Option<String> {
        let value = self.get(record, name);
        (!is_missing(value)).then(|| value.to_string())
    }

    fn error(&self, row: usize, column: &str, value: &str, reason: impl Into<String>) -> ReportError {
        ReportError::data_quality(self.table, row, column, value, reason)
    }

    fn date(&self, record: &StringRecord, row: usize, name: &str) -> Result<NaiveDate, ReportError> {
        let value = self.get(record, name);
        parse_date(value).ok_or_else(|| self.error(row, name, value, "expected YYYY-MM-DD"))
    }

    fn amount(&self, record: &StringRecord, row: usize, name: &str) -> Result<f64, ReportError> {
        let value = self.get(record, name);
        parse_amount(value).ok_or_else(|| self.error(row, name, value, "expected a number"))
    }

    fn count(&self, record: &StringRecord, row: usize, name: &str) -> Result<i64, ReportError> {
        let value = self.get(record, name);
        parse_count(value).ok_or_else(|| self.error(row, name, value, "expected a whole number"))
    }

    fn label<T, E>(
        &self,
        record: &StringRecord,
        row: usize,
        name: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<T, ReportError>
    where
        E: std::fmt::Display,
    {
        let value = self.get(record, name);
        parse(value).map_err(|e| self.error(row, name, value, e.to_string()))
    }
}

/// `YYYY-MM-DD`, ignoring any trailing time component.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Empty cells read as 0; thousands separators are dropped.
fn parse_amount(value: &str) -> Option<f64> {
    if value.is_empty() {
        return Some(0.0);
    }
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_count(value: &str) -> Option<i64> {
    let amount = parse_amount(value)?;
    (amount.fract() == 0.0).then_some(amount as i64)
}

/// `"Week 6, 2025"` as `(2025, 6)`.
fn parse_week_label(value: &str) -> Option<(i32, u32)> {
    let rest = value.trim().strip_prefix("Week")?;
    let (week, year) = rest.split_once(',')?;
    Some((year.trim().parse().ok()?, week.trim().parse().ok()?))
}

/// A 1-based line number for error messages, counting the header as line 1.
fn line_of(record: &StringRecord, index: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(index + 2)
}

pub struct CsvAdapter {
    transactions: PathBuf,
    sessions: Option<PathBuf>,
    spend: Option<PathBuf>,
    gross_margin: Option<PathBuf>,
    aliases: BTreeMap<String, MarketCode>,
}

impl CsvAdapter {
    pub fn new(transactions: impl Into<PathBuf>) -> Self {
        Self {
            transactions: transactions.into(),
            sessions: None,
            spend: None,
            gross_margin: None,
            aliases: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            transactions: config.data.transactions.clone(),
            sessions: config.data.sessions.clone(),
            spend: config.data.spend.clone(),
            gross_margin: config.data.gross_margin.clone(),
            aliases: config.aliases.clone(),
        }
    }

    pub fn with_sessions(mut self, path: impl Into<PathBuf>) -> Self {
        self.sessions = Some(path.into());
        self
    }

    pub fn with_spend(mut self, path: impl Into<PathBuf>) -> Self {
        self.spend = Some(path.into());
        self
    }

    pub fn with_gross_margin(mut self, path: impl Into<PathBuf>) -> Self {
        self.gross_margin = Some(path.into());
        self
    }

    /// Session-country and spend-market labels are mapped through these
    /// before becoming market codes.
    pub fn with_aliases(mut self, aliases: BTreeMap<String, MarketCode>) -> Self {
        self.aliases = aliases;
        self
    }

    fn market(&self, label: &str) -> Result<MarketCode, ReportError> {
        market_for_label(&self.aliases, label)
    }

    fn read(table: &'static str, path: &Path) -> Result<(StringRecord, Vec<StringRecord>), ReportError> {
        let content = fs::read_to_string(path).map_err(|e| ReportError::Source {
            table: table.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let text = content.trim_start_matches('\u{FEFF}');
        let first_line = text.lines().next().unwrap_or("");
        let delimiter = if first_line.contains(';') && !first_line.contains(',') {
            b';'
        } else {
            b','
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(text.as_bytes());
        let parse_error = |e: csv::Error| ReportError::Source {
            table: table.to_string(),
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        };
        let headers = rdr.headers().map_err(parse_error)?.clone();
        let records = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(parse_error)?;
        tracing::debug!(table, path = %path.display(), rows = records.len(), "read CSV");
        Ok((headers, records))
    }

    /// `None` when no path is configured or the file does not exist.
    fn optional_path<'p>(table: &str, path: Option<&'p PathBuf>) -> Option<&'p PathBuf> {
        let path = path?;
        if path.exists() {
            Some(path)
        } else {
            tracing::warn!(table, path = %path.display(), "optional source file not found");
            None
        }
    }

    fn transaction(
        &self,
        idx: &HeaderIndex,
        record: &StringRecord,
        row: usize,
    ) -> Result<TransactionRecord, ReportError> {
        let customer_type = match idx.optional(record, "customer_type") {
            None => None,
            Some(_) => Some(idx.label(record, row, "customer_type", str::parse::<CustomerType>)?),
        };
        let gender = match idx.optional(record, "gender") {
            None => None,
            Some(_) => Some(idx.label(record, row, "gender", str::parse::<Gender>)?),
        };
        Ok(TransactionRecord {
            date: idx.date(record, row, "date")?,
            channel: idx.label(record, row, "channel", str::parse::<Channel>)?,
            order_id: idx.get(record, "order_id").to_string(),
            customer_id: idx.optional(record, "customer_id"),
            customer_type,
            market: idx.label(record, row, "market", MarketCode::new)?,
            gender,
            category: idx.optional(record, "category").map(|c| c.to_uppercase()),
            product: idx.get(record, "product").to_string(),
            color: idx.get(record, "color").to_string(),
            gross_revenue: idx.amount(record, row, "gross_revenue")?,
            returns: idx.amount(record, row, "returns")?,
            qty: idx.count(record, row, "qty")?,
        })
    }

    fn session(
        &self,
        idx: &HeaderIndex,
        record: &StringRecord,
        row: usize,
    ) -> Result<SessionRecord, ReportError> {
        let market = match idx.optional(record, "market") {
            None => None,
            Some(_) => Some(idx.label(record, row, "market", |l| self.market(l))?),
        };
        let sessions = idx.count(record, row, "sessions")?;
        let sessions = u64::try_from(sessions).map_err(|_| {
            idx.error(row, "sessions", idx.get(record, "sessions"), "must not be negative")
        })?;
        Ok(SessionRecord {
            date: idx.date(record, row, "date")?,
            market,
            sessions,
        })
    }

    fn spend(&self, idx: &HeaderIndex, record: &StringRecord, row: usize) -> Result<SpendRecord, ReportError> {
        Ok(SpendRecord {
            date: idx.date(record, row, "date")?,
            market: idx.label(record, row, "market", |l| self.market(l))?,
            total_spend: idx.amount(record, row, "total_spend")?,
        })
    }

    fn gross_margin(
        &self,
        idx: &HeaderIndex,
        record: &StringRecord,
        row: usize,
    ) -> Result<GrossMarginRecord, ReportError> {
        let (iso_year, iso_week) = if idx.has("week_label") {
            let value = idx.get(record, "week_label");
            parse_week_label(value)
                .ok_or_else(|| idx.error(row, "week_label", value, "expected \"Week N, YYYY\""))?
        } else {
            let year = idx.count(record, row, "iso_year")?;
            let week = idx.count(record, row, "iso_week")?;
            let year = i32::try_from(year)
                .map_err(|_| idx.error(row, "iso_year", idx.get(record, "iso_year"), "out of range"))?;
            let week = u32::try_from(week)
                .map_err(|_| idx.error(row, "iso_week", idx.get(record, "iso_week"), "out of range"))?;
            (year, week)
        };
        if !(1..=53).contains(&iso_week) {
            return Err(idx.error(row, "iso_week", &iso_week.to_string(), "ISO week must be 1-53"));
        }
        Ok(GrossMarginRecord {
            iso_year,
            iso_week,
            gm2: idx.amount(record, row, "gm2")?,
        })
    }

    fn load<T>(
        table: &'static str,
        path: &Path,
        columns: &[Column],
        mut parse: impl FnMut(&HeaderIndex, &StringRecord, usize) -> Result<T, ReportError>,
    ) -> Result<Vec<T>, ReportError> {
        let (headers, records) = Self::read(table, path)?;
        let idx = HeaderIndex::new(table, &headers, columns)?;
        records
            .iter()
            .enumerate()
            .map(|(i, record)| parse(&idx, record, line_of(record, i)))
            .collect()
    }
}

impl ReportDataPort for CsvAdapter {
    fn load_transactions(&self) -> Result<Vec<TransactionRecord>, ReportError> {
        Self::load("transactions", &self.transactions, TRANSACTION_COLUMNS, |idx, r, row| {
            self.transaction(idx, r, row)
        })
    }

    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>, ReportError> {
        let Some(path) = Self::optional_path("sessions", self.sessions.as_ref()) else {
            return Ok(None);
        };
        Self::load("sessions", path, SESSION_COLUMNS, |idx, r, row| self.session(idx, r, row)).map(Some)
    }

    fn load_spend(&self) -> Result<Option<Vec<SpendRecord>>, ReportError> {
        let Some(path) = Self::optional_path("spend", self.spend.as_ref()) else {
            return Ok(None);
        };
        Self::load("spend", path, SPEND_COLUMNS, |idx, r, row| self.spend(idx, r, row)).map(Some)
    }

    fn load_gross_margins(&self) -> Result<Option<Vec<GrossMarginRecord>>, ReportError> {
        let Some(path) = Self::optional_path("gross_margin", self.gross_margin.as_ref()) else {
            return Ok(None);
        };
        let (headers, records) = Self::read("gross_margin", path)?;
        let idx = HeaderIndex::new("gross_margin", &headers, GROSS_MARGIN_COLUMNS)?;
        if !idx.has("week_label") && !(idx.has("iso_year") && idx.has("iso_week")) {
            return Err(ReportError::MissingColumns {
                table: "gross_margin".to_string(),
                columns: ["iso_year", "iso_week"]
                    .into_iter()
                    .filter(|c| !idx.has(c))
                    .map(str::to_string)
                    .collect(),
            });
        }
        records
            .iter()
            .enumerate()
            .map(|(i, record)| self.gross_margin(&idx, record, line_of(record, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::CalendarWindowResolver;
    use crate::domain::dataset::ReportData;
    use crate::domain::metrics::{Metric, MetricsAggregator};
    use crate::domain::record::{reporting_gender, ReportGender};
    use crate::domain::scope::MarketScope;
    use tempfile::TempDir;

    const SOURCE_HEADER: &str = "Date,Sales Channel,Order No,Customer E-mail,New/Returning Customer,\
        Country,Gender,Product Category,Product,Color,Gross Revenue,Returns,Sales Qty\n";

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_source_labels() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{SOURCE_HEADER}\
             2025-02-04 10:15:00,Online,1001,a@x.se,New,Sweden,Women, tees ,Tee,Black,\"1,250.50\",0,2\n\
             2025-02-04,Retail Pop-up,1002,,,Norway,,,,,300,,1\n"
        );
        let path = write(&dir, "sales.csv", &content);
        let rows = CsvAdapter::new(path).load_transactions().unwrap();

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());
        assert_eq!(first.channel, Channel::Online);
        assert_eq!(first.customer_type, Some(CustomerType::New));
        assert_eq!(first.gender, Some(Gender::Women));
        assert_eq!(first.category.as_deref(), Some("TEES"));
        assert_eq!(first.gross_revenue, 1250.5);
        assert_eq!(first.qty, 2);

        let second = &rows[1];
        assert_eq!(second.channel, Channel::RetailPopUp);
        assert_eq!(second.customer_id, None);
        assert_eq!(second.customer_type, None);
        assert_eq!(second.gender, None);
        assert_eq!(second.category, None);
        assert_eq!(second.returns, 0.0);
    }

    #[test]
    fn dash_cells_read_as_missing() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{SOURCE_HEADER}\
             2025-02-04,Online,1,-,-,Sweden,-,-,-,-,100,0,1\n\
             2025-02-04,Online,2,a@x.se,New,Sweden,-,TEES,Tee,Black,200,0,1\n"
        );
        let path = write(&dir, "sales.csv", &content);
        let rows = CsvAdapter::new(path).load_transactions().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_id, None);
        assert_eq!(rows[0].customer_type, None);
        assert_eq!(rows[0].gender, None);
        assert_eq!(rows[0].category, None);
        assert_eq!(rows[0].product, "-");
        assert_eq!(rows[1].gender, None);
        assert_eq!(reporting_gender(rows[1].gender), ReportGender::Men);
        assert_eq!(rows[1].customer_id.as_deref(), Some("a@x.se"));
    }

    #[test]
    fn dash_customer_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "{SOURCE_HEADER}\
             2025-02-04,Online,1,a@x.se,New,Sweden,Women,TEES,Tee,Black,200,0,1\n\
             2025-02-05,Online,2,-,New,Sweden,Women,TEES,Tee,Black,200,0,1\n"
        );
        let path = write(&dir, "sales.csv", &content);
        let data = ReportData::new(CsvAdapter::new(path).load_transactions().unwrap());
        let week = CalendarWindowResolver::new(NaiveDate::from_ymd_opt(2025, 2, 9).unwrap())
            .current_week();
        let m = MetricsAggregator::new(&data).aggregate(&week, &MarketScope::All);

        assert_eq!(m.get(Metric::NewCustomers), 1.0);
        assert_eq!(m.get(Metric::GrossRevenueNew), 200.0);
        assert_eq!(m.get(Metric::AovNew), 200.0);
        assert_eq!(m.get(Metric::GrossRevenue), 400.0);
    }

    #[test]
    fn reads_canonical_names_in_any_order() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "sales.csv",
            "qty,returns,gross_revenue,market,customer_type,customer_id,order_id,channel,date\n\
             1,5,50,Denmark,Returning,b@x.dk,7,Wholesale,2025-01-01\n",
        );
        let rows = CsvAdapter::new(path).load_transactions().unwrap();
        assert_eq!(rows[0].channel, Channel::Wholesale);
        assert_eq!(rows[0].market.as_str(), "Denmark");
        assert_eq!(rows[0].product, "");
    }

    #[test]
    fn reports_all_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sales.csv", "Date,Sales Channel,Order No,Country\n");
        let err = CsvAdapter::new(path).load_transactions().unwrap_err();
        match err {
            ReportError::MissingColumns { table, columns } => {
                assert_eq!(table, "transactions");
                assert_eq!(
                    columns,
                    vec!["customer_id", "customer_type", "gross_revenue", "returns", "qty"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_channel_is_a_data_quality_error() {
        let dir = TempDir::new().unwrap();
        let content = format!("{SOURCE_HEADER}2025-02-04,Retail Pop-Up,1,a,New,Sweden,,,,,1,0,1\n");
        let path = write(&dir, "sales.csv", &content);
        let err = CsvAdapter::new(path).load_transactions().unwrap_err();
        match err {
            ReportError::DataQuality { table, row, column, value, .. } => {
                assert_eq!(table, "transactions");
                assert_eq!(row, 2);
                assert_eq!(column, "channel");
                assert_eq!(value, "Retail Pop-Up");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_date_and_amount_are_rejected() {
        let dir = TempDir::new().unwrap();
        let bad_date = format!("{SOURCE_HEADER}04/02/2025,Online,1,a,New,Sweden,,,,,1,0,1\n");
        let path = write(&dir, "a.csv", &bad_date);
        assert!(matches!(
            CsvAdapter::new(path).load_transactions(),
            Err(ReportError::DataQuality { ref column, .. }) if column == "date"
        ));

        let bad_amount = format!("{SOURCE_HEADER}2025-02-04,Online,1,a,New,Sweden,,,,,abc,0,1\n");
        let path = write(&dir, "b.csv", &bad_amount);
        assert!(matches!(
            CsvAdapter::new(path).load_transactions(),
            Err(ReportError::DataQuality { ref column, .. }) if column == "gross_revenue"
        ));
    }

    #[test]
    fn missing_transactions_file_is_a_source_error() {
        let err = CsvAdapter::new("/nonexistent/sales.csv").load_transactions().unwrap_err();
        assert!(matches!(err, ReportError::Source { .. }));
    }

    #[test]
    fn optional_sources_absent() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().join("sales.csv"))
            .with_sessions(dir.path().join("missing_sessions.csv"));
        assert_eq!(adapter.load_sessions().unwrap(), None);
        assert_eq!(adapter.load_spend().unwrap(), None);
        assert_eq!(adapter.load_gross_margins().unwrap(), None);
    }

    #[test]
    fn sessions_map_through_aliases() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "sessions.csv",
            "Day,Session country,Sessions\n\
             2025-02-03,United States,120\n\
             2025-02-03,Sweden,\"1,000\"\n\
             2025-02-04,,7\n",
        );
        let mut aliases = BTreeMap::new();
        aliases.insert("United States".to_string(), MarketCode::new("USA").unwrap());
        let sessions = CsvAdapter::new("unused.csv")
            .with_sessions(path)
            .with_aliases(aliases)
            .load_sessions()
            .unwrap()
            .unwrap();

        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].market.as_ref().map(|m| m.as_str()), Some("USA"));
        assert_eq!(sessions[1].sessions, 1000);
        assert_eq!(sessions[2].market, None);
    }

    #[test]
    fn negative_sessions_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "sessions.csv", "date,market,sessions\n2025-02-03,Sweden,-4\n");
        let err = CsvAdapter::new("unused.csv").with_sessions(path).load_sessions().unwrap_err();
        assert!(matches!(err, ReportError::DataQuality { ref column, .. } if column == "sessions"));
    }

    #[test]
    fn reads_spend() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "spend.csv", "Day,Market,Total Spend\n2025-02-03,Sweden,99.5\n");
        let spend = CsvAdapter::new("unused.csv").with_spend(path).load_spend().unwrap().unwrap();
        assert_eq!(spend[0].total_spend, 99.5);
        assert_eq!(spend[0].market.as_str(), "Sweden");
    }

    #[test]
    fn reads_semicolon_gross_margin_export() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "gm2.csv",
            "Weeks;Gross margin 2 - Dema MTA\nWeek 6, 2025;0.52\nWeek 53, 2020;0.4\n",
        );
        let gm = CsvAdapter::new("unused.csv")
            .with_gross_margin(path)
            .load_gross_margins()
            .unwrap()
            .unwrap();
        assert_eq!(gm.len(), 2);
        assert_eq!((gm[0].iso_year, gm[0].iso_week, gm[0].gm2), (2025, 6, 0.52));
        assert_eq!((gm[1].iso_year, gm[1].iso_week), (2020, 53));
    }

    #[test]
    fn reads_canonical_gross_margin() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gm2.csv", "iso_year,iso_week,gm2\n2025,6,0.5\n");
        let gm = CsvAdapter::new("unused.csv")
            .with_gross_margin(path)
            .load_gross_margins()
            .unwrap()
            .unwrap();
        assert_eq!(gm[0], GrossMarginRecord { iso_year: 2025, iso_week: 6, gm2: 0.5 });
    }

    #[test]
    fn gross_margin_without_week_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gm2.csv", "iso_year,gm2\n2025,0.5\n");
        let err = CsvAdapter::new("unused.csv")
            .with_gross_margin(path)
            .load_gross_margins()
            .unwrap_err();
        match err {
            ReportError::MissingColumns { columns, .. } => assert_eq!(columns, vec!["iso_week"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn week_label_parsing() {
        assert_eq!(parse_week_label("Week 1, 2024"), Some((2024, 1)));
        assert_eq!(parse_week_label("W1 2024"), None);
    }
}
