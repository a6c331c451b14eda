pub const CREATE_MEMBERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
";

pub const CREATE_CATEGORIES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (member_id) REFERENCES members(id),
        UNIQUE(member_id, name)
    )
";

pub const CREATE_TEMPLATES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (member_id) REFERENCES members(id),
        FOREIGN KEY (category_id) REFERENCES categories(id)
    )
";

pub const CREATE_SOURCE_CODES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS source_codes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        template_id INTEGER NOT NULL,
        filename TEXT NOT NULL,
        content TEXT NOT NULL,
        ordinal INTEGER NOT NULL,
        FOREIGN KEY (template_id) REFERENCES templates(id) ON DELETE CASCADE
    )
";

pub const CREATE_TAGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
";

pub const CREATE_TEMPLATE_TAGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS template_tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        template_id INTEGER NOT NULL,
        tag_id INTEGER NOT NULL,
        FOREIGN KEY (template_id) REFERENCES templates(id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tags(id),
        UNIQUE(template_id, tag_id)
    )
";

pub const CREATE_LIKES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS likes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        template_id INTEGER NOT NULL,
        member_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (template_id) REFERENCES templates(id) ON DELETE CASCADE,
        FOREIGN KEY (member_id) REFERENCES members(id),
        UNIQUE(template_id, member_id)
    )
";

pub const CREATE_INDEX_TEMPLATES_MEMBER: &str =
    "CREATE INDEX IF NOT EXISTS idx_templates_member_id ON templates(member_id)";

pub const CREATE_INDEX_TEMPLATES_CATEGORY: &str =
    "CREATE INDEX IF NOT EXISTS idx_templates_category_id ON templates(category_id)";

pub const CREATE_INDEX_SOURCE_CODES_TEMPLATE: &str =
    "CREATE INDEX IF NOT EXISTS idx_source_codes_template_id ON source_codes(template_id)";

pub const CREATE_INDEX_TEMPLATE_TAGS_TAG: &str =
    "CREATE INDEX IF NOT EXISTS idx_template_tags_tag_id ON template_tags(tag_id)";

pub const ALL: &[&str] = &[
    CREATE_MEMBERS_TABLE,
    CREATE_CATEGORIES_TABLE,
    CREATE_TEMPLATES_TABLE,
    CREATE_SOURCE_CODES_TABLE,
    CREATE_TAGS_TABLE,
    CREATE_TEMPLATE_TAGS_TABLE,
    CREATE_LIKES_TABLE,
    CREATE_INDEX_TEMPLATES_MEMBER,
    CREATE_INDEX_TEMPLATES_CATEGORY,
    CREATE_INDEX_SOURCE_CODES_TEMPLATE,
    CREATE_INDEX_TEMPLATE_TAGS_TAG,
];
