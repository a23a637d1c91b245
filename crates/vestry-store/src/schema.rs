// SPDX-License-Identifier: Apache-2.0
pub const SCHEMA_VERSION: i64 = 1;

/// Ledger schema. Rows are immutable once written; there are no UPDATE
/// paths anywhere in the store. `(title, date)` is the notice natural key.
pub const BOOTSTRAP_SQL: &str = "
    CREATE TABLE IF NOT EXISTS weekly_reports (
      id INTEGER PRIMARY KEY,
      date TEXT NOT NULL,
      attendance INTEGER NOT NULL DEFAULT 0,
      newcomers INTEGER NOT NULL DEFAULT 0,
      offering_total INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_weekly_reports_date ON weekly_reports(date);

    CREATE TABLE IF NOT EXISTS transactions (
      id INTEGER PRIMARY KEY,
      date TEXT NOT NULL,
      direction TEXT NOT NULL,
      category TEXT NOT NULL,
      description TEXT NOT NULL,
      amount INTEGER NOT NULL,
      created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS reviews (
      id INTEGER PRIMARY KEY,
      author TEXT NOT NULL,
      content TEXT NOT NULL,
      rating INTEGER NOT NULL DEFAULT 5,
      submitter_ip TEXT,
      created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews(created_at);
    CREATE INDEX IF NOT EXISTS idx_reviews_ip_day ON reviews(submitter_ip, date(created_at));

    CREATE TABLE IF NOT EXISTS notices (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      body TEXT NOT NULL DEFAULT '',
      attachments TEXT NOT NULL DEFAULT '[]',
      date TEXT NOT NULL,
      created_at TEXT NOT NULL,
      UNIQUE (title, date)
    );
    CREATE INDEX IF NOT EXISTS idx_notices_date ON notices(date);

    CREATE TABLE IF NOT EXISTS slides (
      id INTEGER PRIMARY KEY,
      title TEXT NOT NULL,
      image_url TEXT NOT NULL,
      position INTEGER NOT NULL DEFAULT 0,
      active INTEGER NOT NULL DEFAULT 1
    );
";
