pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bureau_status (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    bureau TEXT NOT NULL CHECK (bureau IN ('equifax', 'transunion', 'experian')),
    status TEXT NOT NULL DEFAULT 'not_frozen' CHECK (status IN ('frozen', 'not_frozen')),
    status_updated_at TEXT NOT NULL,
    frozen_date TEXT,
    notes TEXT,
    UNIQUE (user_id, bureau)
);

CREATE TABLE IF NOT EXISTS thaw_reminders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    bureau TEXT NOT NULL CHECK (bureau IN ('equifax', 'transunion', 'experian')),
    thaw_start_date TEXT NOT NULL,
    thaw_end_date TEXT NOT NULL,
    set_at_bureau INTEGER NOT NULL DEFAULT 0,
    reminder_sent INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    cancelled_at TEXT,
    CHECK (thaw_end_date >= thaw_start_date)
);

CREATE TABLE IF NOT EXISTS freeze_workflow_progress (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE,
    current_step TEXT NOT NULL DEFAULT 'checklist' CHECK (current_step IN ('checklist', 'equifax', 'transunion', 'experian', 'complete')),
    checklist_completed INTEGER NOT NULL DEFAULT 0,
    equifax_completed INTEGER NOT NULL DEFAULT 0,
    transunion_completed INTEGER NOT NULL DEFAULT 0,
    experian_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_log (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    bureau TEXT NOT NULL CHECK (bureau IN ('equifax', 'transunion', 'experian')),
    action TEXT NOT NULL CHECK (action IN ('frozen', 'unfrozen', 'thaw_scheduled', 'thaw_cancelled', 'issue_reported')),
    source TEXT NOT NULL CHECK (source IN ('freeze_workflow', 'manual_update', 'scheduled_thaw')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS freeze_issues (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    session_id TEXT,
    bureau TEXT NOT NULL CHECK (bureau IN ('equifax', 'transunion', 'experian')),
    issue_type TEXT NOT NULL CHECK (issue_type IN ('account_access', 'identity_verification', 'site_error', 'asked_to_pay', 'confused', 'other')),
    issue_details TEXT,
    source TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS breach_visits (
    id TEXT PRIMARY KEY,
    breach_code TEXT NOT NULL,
    source TEXT NOT NULL CHECK (source IN ('direct', 'homepage')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS breach_freeze_events (
    id TEXT PRIMARY KEY,
    breach_code TEXT NOT NULL DEFAULT '',
    bureau TEXT NOT NULL CHECK (bureau IN ('equifax', 'transunion', 'experian')),
    session_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (session_id, bureau, breach_code)
);

CREATE INDEX IF NOT EXISTS idx_thaw_reminders_user ON thaw_reminders(user_id, bureau);
CREATE INDEX IF NOT EXISTS idx_activity_log_user ON activity_log(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_breach_visits_code ON breach_visits(breach_code);
"#;
