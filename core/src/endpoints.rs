//! Backend endpoint paths. These strings are the wire contract with the
//! GlucoVision API and must stay verbatim.

use uuid::Uuid;

pub const HEALTH: &str = "/health";

pub const AUTH_REGISTER: &str = "/api/v1/auth/register";
pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const AUTH_REFRESH: &str = "/api/v1/auth/refresh";
pub const AUTH_LOGOUT: &str = "/api/v1/auth/logout";
pub const AUTH_CHANGE_PASSWORD: &str = "/api/v1/auth/change-password";
pub const AUTH_ME: &str = "/api/v1/auth/me";
pub const AUTH_VERIFY_TOKEN: &str = "/api/v1/auth/verify-token";
pub const AUTH_FORGOT_PASSWORD: &str = "/api/v1/auth/forgot-password";
pub const AUTH_VERIFY_RESET_CODE: &str = "/api/v1/auth/verify-reset-code";
pub const AUTH_RESET_PASSWORD: &str = "/api/v1/auth/reset-password";

pub const USERS_PROFILE: &str = "/api/v1/users/profile";
pub const USERS_ONBOARDING_STATUS: &str = "/api/v1/users/onboarding/status";
pub const USERS_ONBOARDING_STEP1: &str = "/api/v1/users/onboarding/step1";
pub const USERS_ONBOARDING_STEP2: &str = "/api/v1/users/onboarding/step2";
pub const USERS_ONBOARDING_STEP3: &str = "/api/v1/users/onboarding/step3";
pub const USERS_ACCOUNT: &str = "/api/v1/users/account";

pub const GLUCOSE_LOGS: &str = "/api/v1/glucose/logs";
pub const GLUCOSE_STATS: &str = "/api/v1/glucose/stats";

pub const AI_INSIGHTS: &str = "/api/v1/ai/insights";
pub const AI_TRENDS: &str = "/api/v1/ai/trends";
pub const AI_RECOMMENDATIONS: &str = "/api/v1/ai/recommendations";
pub const AI_RISK_ASSESSMENT: &str = "/api/v1/ai/risk-assessment";
pub const AI_PATTERNS: &str = "/api/v1/ai/patterns";
pub const AI_CHAT: &str = "/api/v1/ai/chat";
pub const AI_CONVERSATIONS: &str = "/api/v1/ai/conversations";

pub const REPORTS_GLUCOSE_SUMMARY: &str = "/api/v1/reports/glucose-summary";
pub const REPORTS_MEDICAL_REPORT: &str = "/api/v1/reports/medical-report";
pub const REPORTS_EXPORT_DATA: &str = "/api/v1/reports/export-data";

pub fn glucose_log(id: Uuid) -> String {
    format!("{GLUCOSE_LOGS}/{id}")
}

pub fn conversation_messages(conversation_id: &str) -> String {
    format!("{AI_CONVERSATIONS}/{conversation_id}/messages")
}
