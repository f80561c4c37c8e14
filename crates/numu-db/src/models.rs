/// Database row types. These map directly to SQLite rows and stay
/// independent of the numu-types API models.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub password: String,
    pub created_at: String,
}

pub struct SnapshotRow {
    pub version: u64,
    pub taken_at: String,
    /// Serialized marketplace JSON.
    pub payload: String,
}
