//! Typed client for the GlucoVision API.
//!
//! # Design
//! `GlucoVisionClient` is a thin layer over `RequestEngine`: every method
//! builds a `RequestDescriptor` for one canonical endpoint, runs it, and
//! decodes the JSON envelope into a DTO. It holds the session token and
//! nothing else; callers sequence dependent calls themselves (log in, store
//! the token, then fetch the profile).

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::endpoints;
use crate::engine::RequestEngine;
use crate::envelope::Envelope;
use crate::error::ENCODE_MESSAGE;
use crate::request::RequestDescriptor;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AuthResponse, CurrentUser, GlucoseLog, GlucoseLogList, GlucoseLogUpdate, GlucoseStats, Health, LogQuery,
    LoginRequest, MessageResponse, NewGlucoseLog, ProfileUpdate, RegisterRequest, User,
};

pub struct GlucoVisionClient<T = UreqTransport> {
    engine: RequestEngine<T>,
    token: Option<String>,
}

impl GlucoVisionClient<UreqTransport> {
    pub fn new(config: ApiConfig) -> Self {
        Self::from_engine(RequestEngine::new(config))
    }
}

impl<T: Transport> GlucoVisionClient<T> {
    pub fn from_engine(engine: RequestEngine<T>) -> Self {
        Self {
            engine,
            token: None,
        }
    }

    pub fn engine(&self) -> &RequestEngine<T> {
        &self.engine
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn health(&self) -> Envelope<Health> {
        self.engine.request(RequestDescriptor::get(endpoints::HEALTH)).decode()
    }

    pub fn register(&self, input: &RegisterRequest) -> Envelope<AuthResponse> {
        self.send(RequestDescriptor::post(endpoints::AUTH_REGISTER), input)
    }

    pub fn login(&self, input: &LoginRequest) -> Envelope<AuthResponse> {
        self.send(RequestDescriptor::post(endpoints::AUTH_LOGIN), input)
    }

    pub fn logout(&self) -> Envelope<MessageResponse> {
        self.authed(RequestDescriptor::post(endpoints::AUTH_LOGOUT))
    }

    pub fn current_user(&self) -> Envelope<CurrentUser> {
        self.authed(RequestDescriptor::get(endpoints::AUTH_ME))
    }

    pub fn profile(&self) -> Envelope<User> {
        self.authed(RequestDescriptor::get(endpoints::USERS_PROFILE))
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Envelope<User> {
        self.send(
            RequestDescriptor::put(endpoints::USERS_PROFILE).bearer_opt(self.token()),
            update,
        )
    }

    pub fn create_glucose_log(&self, log: &NewGlucoseLog) -> Envelope<GlucoseLog> {
        self.send(
            RequestDescriptor::post(endpoints::GLUCOSE_LOGS).bearer_opt(self.token()),
            log,
        )
    }

    pub fn glucose_logs(&self, query: &LogQuery) -> Envelope<GlucoseLogList> {
        let descriptor = RequestDescriptor::get(endpoints::GLUCOSE_LOGS)
            .query("page", query.page)
            .query("page_size", query.page_size)
            .query("start_date", query.start_date.clone())
            .query("end_date", query.end_date.clone())
            .query("reading_type", query.reading_type.map(|t| t.as_str()))
            .query("min_glucose", query.min_glucose)
            .query("max_glucose", query.max_glucose);
        self.authed(descriptor)
    }

    pub fn glucose_log(&self, id: Uuid) -> Envelope<GlucoseLog> {
        self.authed(RequestDescriptor::get(endpoints::glucose_log(id)))
    }

    pub fn update_glucose_log(&self, id: Uuid, update: &GlucoseLogUpdate) -> Envelope<GlucoseLog> {
        self.send(
            RequestDescriptor::put(endpoints::glucose_log(id)).bearer_opt(self.token()),
            update,
        )
    }

    pub fn delete_glucose_log(&self, id: Uuid) -> Envelope<MessageResponse> {
        self.authed(RequestDescriptor::delete(endpoints::glucose_log(id)))
    }

    pub fn glucose_stats(&self, days: Option<u32>) -> Envelope<GlucoseStats> {
        self.authed(RequestDescriptor::get(endpoints::GLUCOSE_STATS).query("days", days))
    }

    fn authed<R: serde::de::DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Envelope<R> {
        self.engine
            .request(descriptor.bearer_opt(self.token()))
            .decode()
    }

    fn send<B, R>(&self, descriptor: RequestDescriptor, body: &B) -> Envelope<R>
    where
        B: Serialize,
        R: serde::de::DeserializeOwned,
    {
        let body: Value = match serde_json::to_value(body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, endpoint = %descriptor.endpoint, "could not encode request body");
                return Envelope::failure(ENCODE_MESSAGE);
            }
        };
        self.engine.request(descriptor.json(body)).decode()
    }
}
