/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    // Referential integrity must be opted into per connection
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| StorageError::Migration(format!("Failed to enable foreign keys: {}", e)))?;

    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    // Check current version
    let current_version = get_current_version(conn)?;

    // Run migrations if needed
    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0); // Default to version 0 if no version record exists

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    // Future migrations would go here:
    // if from_version < 2 {
    //     migration_v2(conn)?;
    // }

    Ok(())
}

/// Migration to version 1: Create initial tables
///
/// This creates the core tables for users, habits, and completion events.
/// Settings, badges and completion histories are stored as JSON columns;
/// they are read and written whole, never queried into.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    // Create users table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            display_name TEXT NOT NULL,
            settings TEXT NOT NULL,
            xp INTEGER NOT NULL DEFAULT 0,
            level INTEGER NOT NULL DEFAULT 1,
            badges TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Create habits table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            frequency TEXT NOT NULL,
            streak INTEGER NOT NULL DEFAULT 0,
            last_completed TEXT,
            completion_history TEXT NOT NULL,
            reminder_enabled BOOLEAN NOT NULL DEFAULT FALSE,
            reminder_time TEXT,
            next_reminder_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id)
        )",
        [],
    )?;

    // Create completion_events table
    //
    // habit_id deliberately has no foreign key: events must survive habit
    // deletion so analytics keep counting them.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_events (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            habit_id TEXT NOT NULL,
            habit_name TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            completed_on TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id)
        )",
        [],
    )?;

    // Create indexes for better query performance
    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Uniqueness of email addresses is enforced here rather than in code
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
         ON users (email)",
        [],
    )?;

    // Index for listing a user's habits
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_user
         ON habits (user_id)",
        [],
    )?;

    // Index for the reminder sweep (enabled habits ordered by due time)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_due
         ON habits (reminder_enabled, next_reminder_at)",
        [],
    )?;

    // Index for windowed analytics queries (most common query)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_user_completed
         ON completion_events (user_id, completed_on)",
        [],
    )?;

    // Index for per-habit event lookups
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_habit
         ON completion_events (habit_id)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}
