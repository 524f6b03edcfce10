// SPDX-License-Identifier: MIT

//! Ordered schema migrations.
//!
//! Forward order matters: `users.assigned_testid` references `tests`, and
//! `questions`/`results` reference their parents. The drop migration runs
//! in exact reverse order.

/// Forward migration, applied statement by statement.
pub const MIGRATIONS_UP: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS tests (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        no_of_questions INTEGER NOT NULL DEFAULT 0,
        duration_minutes INTEGER NOT NULL,
        subject TEXT NOT NULL DEFAULT '',
        topic TEXT NOT NULL DEFAULT '',
        instructions TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        scheduled_date DATE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        school TEXT NOT NULL DEFAULT '',
        date_of_birth DATE,
        gender TEXT,
        mobile TEXT,
        city TEXT,
        state TEXT,
        country TEXT,
        is_paid BOOLEAN NOT NULL DEFAULT FALSE,
        assigned_testid INTEGER REFERENCES tests(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS otps (
        email TEXT PRIMARY KEY,
        code VARCHAR(6) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS questions (
        id SERIAL PRIMARY KEY,
        test_id INTEGER NOT NULL REFERENCES tests(id) ON DELETE CASCADE,
        question_text TEXT NOT NULL,
        options TEXT[] NOT NULL,
        correct_option TEXT NOT NULL,
        marks INTEGER NOT NULL DEFAULT 1,
        image_url TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS results (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        test_id INTEGER NOT NULL REFERENCES tests(id) ON DELETE CASCADE,
        score INTEGER NOT NULL,
        highest_score INTEGER,
        submitted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS test_bundles (
        id SERIAL PRIMARY KEY,
        slug TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        price INTEGER NOT NULL,
        features TEXT[] NOT NULL DEFAULT '{}',
        image_url TEXT,
        category TEXT NOT NULL DEFAULT ''
    )
    ",
];

/// Reverse migration, mirror image of `MIGRATIONS_UP`.
pub const MIGRATIONS_DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS test_bundles",
    "DROP TABLE IF EXISTS results",
    "DROP TABLE IF EXISTS questions",
    "DROP TABLE IF EXISTS otps",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS tests",
];
