use shared::ReferralStatus;

/// An introduction of a prospect (or an existing client) by a client
#[derive(Debug, Clone, PartialEq)]
pub struct Referral {
    pub id: i64,
    pub referrer_id: i64,
    pub referrer_name: String,
    pub referred_client_id: Option<i64>,
    /// Name of the referred client when linked, otherwise the prospect name
    pub referred_name: String,
    pub prospect_name: Option<String>,
    pub prospect_email: Option<String>,
    pub prospect_phone: Option<String>,
    pub status: ReferralStatus,
    pub comments: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReferral {
    pub referrer_id: i64,
    pub referred_client_id: Option<i64>,
    pub prospect_name: Option<String>,
    pub prospect_email: Option<String>,
    pub prospect_phone: Option<String>,
    pub comments: Option<String>,
    pub created_at: String,
}
