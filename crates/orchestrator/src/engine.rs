//! The per-message reply state machine.
//!
//! Branches run in priority order and the first match short-circuits the
//! rest: explicit stats request, overuse warning, stats-feature reminder,
//! then the model-backed default path with side-signal derivation. Every
//! processed text message yields exactly one reply, at most one side-signal
//! and exactly one user-turn plus one agent-turn in the conversation log.

use std::sync::Arc;

use bot_core::{
    GiftSelected, InboundEvent, LanguageModel, PaymentConfirmed, PreCheckout, Role, SideSignal,
    TextMessage,
};
use chrono::Utc;
use database::models::Gender;
use database::{conversation, drinks, gifts, profile, quota, Database, DAY_SECS};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::economy::{self, CATALOG};
use crate::error::Result;
use crate::extractor::{extract, FactUpdateSet};
use crate::prompts;
use crate::sender::OutboundGate;
use crate::signals;
use crate::stats;

/// A fully composed reply, ready for dispatch.
struct Reply {
    text: String,
    signal: Option<SideSignal>,
    offer_gifts: bool,
}

impl Reply {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            signal: None,
            offer_gifts: false,
        }
    }
}

/// The engine. Everything it needs arrives through the constructor.
pub struct Orchestrator {
    db: Database,
    model: Arc<dyn LanguageModel>,
    gate: Arc<dyn OutboundGate>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(
        db: Database,
        model: Arc<dyn LanguageModel>,
        gate: Arc<dyn OutboundGate>,
        config: EngineConfig,
    ) -> Self {
        Self {
            db,
            model,
            gate,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entry point for the ingress layer.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<()> {
        let now = Utc::now().timestamp();
        match event {
            InboundEvent::Text(msg) => self.process_text_at(&msg, now).await,
            InboundEvent::GiftSelected(ev) => self.handle_gift_selected(&ev).await,
            InboundEvent::PreCheckout(ev) => self.handle_pre_checkout(&ev).await,
            InboundEvent::PaymentConfirmed(ev) => self.handle_payment_at(&ev, now).await,
        }
    }

    /// Handle one inbound text message at an explicit instant.
    ///
    /// Never bubbles handling failures to the caller: on internal error the
    /// user still gets the configured apology reply.
    pub async fn process_text_at(&self, msg: &TextMessage, now: i64) -> Result<()> {
        let reply = match self.compose(msg, now).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to handle message from {}: {}", msg.user_id, e);
                Reply::text_only(&self.config.apology_reply)
            }
        };

        self.deliver(&msg.conversation_id, &reply, now).await;
        Ok(())
    }

    /// Run extraction and pick a reply branch. No outbound traffic here.
    async fn compose(&self, msg: &TextMessage, now: i64) -> Result<Reply> {
        let pool = self.db.pool();

        profile::upsert_on_inbound(
            pool,
            &msg.user_id,
            &msg.conversation_id,
            msg.display_name.as_deref(),
            now,
        )
        .await?;

        // Snapshot the context window before the current message lands in
        // the log, then append the user turn.
        let history =
            conversation::recent_turns(pool, &msg.conversation_id, self.config.context_window)
                .await?;
        conversation::append_turn(
            pool,
            &msg.conversation_id,
            Role::User.as_str(),
            &msg.text,
            None,
            now,
        )
        .await?;

        // Branch 1: explicit stats request. Deterministic, no model call.
        // Checked before fact extraction so a question about drinking is
        // never itself recorded as a consumption event.
        if stats::is_stats_request(&msg.text) {
            let day_start = now - now.rem_euclid(DAY_SECS);
            let today = drinks::totals_since(pool, &msg.user_id, day_start).await?;
            let week = drinks::totals_since(pool, &msg.user_id, now - 7 * DAY_SECS).await?;
            return Ok(Reply::text_only(stats::format_report(&today, &week)));
        }

        let mut user = profile::require_profile(pool, &msg.user_id).await?;
        let facts = extract(&msg.text);
        self.apply_facts(&mut user, &facts, now).await?;

        // Branch 2: overuse warning, at most once per day. The mark call is
        // the claim, so concurrent handlers cannot both send it.
        let day_start = now - now.rem_euclid(DAY_SECS);
        let today_units = drinks::total_units_since(pool, &msg.user_id, day_start).await?;
        if today_units >= self.config.overuse_threshold
            && profile::mark_overuse_warning(pool, &msg.user_id, now).await?
        {
            return Ok(Reply::text_only(prompts::overuse_warning(today_units)));
        }

        // Branch 3: stats-feature reminder (never told, or told over a day ago).
        if profile::stats_reminder_due(pool, &msg.user_id, now).await? {
            profile::mark_stats_reminder(pool, &msg.user_id, now).await?;
            return Ok(Reply::text_only(prompts::STATS_REMINDER));
        }

        // Branch 4: model-backed reply.
        self.infer_gender_once(&mut user, now).await;

        let system = prompts::system_prompt(&self.config.persona_prompt, &user);
        let context: Vec<_> = history
            .iter()
            .filter_map(|turn| {
                Role::parse(&turn.role).map(|role| bot_core::ContextTurn {
                    role,
                    content: turn.content.clone(),
                })
            })
            .collect();

        let text = match self.model.complete(&system, &context, &msg.text).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call failed for {}: {}", msg.user_id, e);
                self.config.fallback_reply.clone()
            }
        };

        // Derive at most one side-signal from the reply; drink signals are
        // subject to the free quota, and exhaustion turns into a gift offer.
        let mut reply = Reply {
            text,
            signal: None,
            offer_gifts: false,
        };
        match signals::classify(&reply.text) {
            Some(signal) if signal.involves_drink() => {
                if quota::record_consumption(pool, &msg.user_id, now, self.config.quota_max).await?
                {
                    reply.signal = Some(signal);
                } else {
                    debug!("Free quota exhausted for {}, offering gifts", msg.user_id);
                    reply.offer_gifts = true;
                }
            }
            other => reply.signal = other,
        }

        Ok(reply)
    }

    /// Persist whatever the extractor found, updating the local snapshot.
    async fn apply_facts(
        &self,
        user: &mut database::UserProfile,
        facts: &FactUpdateSet,
        now: i64,
    ) -> Result<()> {
        let pool = self.db.pool();

        if let Some(age) = facts.age {
            profile::set_age_hint(pool, &user.user_id, age, now).await?;
            user.age_hint = Some(age);
        }

        if !facts.preferences.is_empty() {
            let mut tags: Vec<String> = user
                .preference_tags
                .as_deref()
                .unwrap_or("")
                .split(", ")
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            for tag in &facts.preferences {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
            let joined = tags.join(", ");
            profile::set_preference_tags(pool, &user.user_id, &joined, now).await?;
            user.preference_tags = Some(joined);
        }

        if let Some(report) = &facts.drink {
            drinks::insert_event(
                pool,
                &user.user_id,
                &report.kind,
                report.amount,
                &report.unit,
                now,
            )
            .await?;
            info!(
                "Recorded consumption for {}: {} {} {}",
                user.user_id, report.amount, report.unit, report.kind
            );
        }

        Ok(())
    }

    /// Ask the model for a gender guess from the display name, once per
    /// user. Failures are skipped silently; the next message retries.
    async fn infer_gender_once(&self, user: &mut database::UserProfile, now: i64) {
        if user.gender != Gender::Unknown {
            return;
        }
        let Some(name) = user.display_name.clone() else {
            return;
        };

        match self
            .model
            .complete("", &[], &prompts::gender_inference(&name))
            .await
        {
            Ok(answer) => {
                let gender = Gender::parse(&answer);
                if gender != Gender::Unknown {
                    match profile::set_gender_if_unknown(self.db.pool(), &user.user_id, gender, now)
                        .await
                    {
                        Ok(true) => user.gender = gender,
                        Ok(false) => {}
                        Err(e) => warn!("Failed to store gender for {}: {}", user.user_id, e),
                    }
                }
            }
            Err(e) => debug!("Gender inference skipped for {}: {}", user.user_id, e),
        }
    }

    /// Push a composed reply out and log the agent turn. Dispatch failures
    /// are logged, never bubbled; the log append happens regardless.
    async fn deliver(&self, conversation_id: &str, reply: &Reply, now: i64) {
        if let Err(e) = self.gate.send_text(conversation_id, &reply.text).await {
            warn!("Failed to send reply to {}: {}", conversation_id, e);
        }

        if let Some(signal) = reply.signal {
            if let Err(e) = self.gate.send_side_signal(conversation_id, signal).await {
                warn!("Failed to send signal to {}: {}", conversation_id, e);
            }
        }

        if reply.offer_gifts {
            if let Err(e) = self
                .gate
                .send_gift_offer(conversation_id, prompts::GIFT_OFFER, &CATALOG)
                .await
            {
                warn!("Failed to send gift offer to {}: {}", conversation_id, e);
            }
        }

        if let Err(e) = conversation::append_turn(
            self.db.pool(),
            conversation_id,
            Role::Agent.as_str(),
            &reply.text,
            reply.signal.map(|s| s.id()),
            now,
        )
        .await
        {
            error!("Failed to log agent turn for {}: {}", conversation_id, e);
        }
    }

    /// A shop button was tapped: acknowledge it and send the invoice.
    pub async fn handle_gift_selected(&self, ev: &GiftSelected) -> Result<()> {
        self.gate.answer_callback(&ev.callback_id).await?;

        match economy::find_item(&ev.item_code) {
            Some(item) => self.gate.send_invoice(&ev.conversation_id, item).await,
            None => {
                warn!("Unknown gift code {} from {}", ev.item_code, ev.user_id);
                self.gate
                    .send_text(&ev.conversation_id, prompts::UNKNOWN_GIFT)
                    .await
            }
        }
    }

    /// Pre-checkout handshake: validate against the catalog, mutate nothing.
    pub async fn handle_pre_checkout(&self, ev: &PreCheckout) -> Result<()> {
        match economy::validate_pre_checkout(&ev.payload, ev.amount, &ev.currency) {
            Ok(item) => {
                debug!("Approving pre-checkout {} for {}", ev.query_id, item.code);
                self.gate.answer_pre_checkout(&ev.query_id, true, None).await
            }
            Err(reason) => {
                warn!(
                    "Rejecting pre-checkout {} ({} {} {}): {}",
                    ev.query_id, ev.payload, ev.amount, ev.currency, reason
                );
                self.gate
                    .answer_pre_checkout(&ev.query_id, false, Some(reason))
                    .await
            }
        }
    }

    /// Confirmed payment: record it once, thank effusively, raise a glass.
    ///
    /// The provider charge id is the idempotency key; a replayed
    /// confirmation changes nothing and sends nothing. The free quota is
    /// untouched either way.
    pub async fn handle_payment_at(&self, ev: &PaymentConfirmed, now: i64) -> Result<()> {
        let pool = self.db.pool();
        let code = economy::decode_payload(&ev.payload).unwrap_or(&ev.payload);
        let raw = serde_json::to_string(&ev.raw).ok();

        let inserted = gifts::insert_successful(
            pool,
            &ev.user_id,
            code,
            ev.amount,
            &ev.currency,
            &ev.charge_id,
            raw.as_deref(),
            now,
        )
        .await?;
        if !inserted {
            info!("Ignoring replayed payment {} from {}", ev.charge_id, ev.user_id);
            return Ok(());
        }

        let display_name = profile::get_profile(pool, &ev.user_id)
            .await?
            .and_then(|p| p.display_name);
        let item = economy::find_item(code);
        let title = item.map(|i| i.title).unwrap_or("напиток");

        let lines = match self
            .model
            .complete(
                &self.config.persona_prompt,
                &[],
                &prompts::gratitude(display_name.as_deref(), title),
            )
            .await
        {
            Ok(raw) => prompts::split_gratitude(&raw),
            Err(e) => {
                warn!("Gratitude generation failed for {}: {}", ev.user_id, e);
                prompts::FALLBACK_THANKS.iter().map(|s| s.to_string()).collect()
            }
        };

        for (i, line) in lines.iter().enumerate() {
            if i > 0 && self.config.thank_you_delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(
                    self.config.thank_you_delay_ms,
                ))
                .await;
            }
            if let Err(e) = self.gate.send_text(&ev.conversation_id, line).await {
                warn!("Failed to send gratitude to {}: {}", ev.conversation_id, e);
            }
        }

        if let Some(item) = item {
            if let Err(e) = self
                .gate
                .send_side_signal(&ev.conversation_id, item.side_signal())
                .await
            {
                warn!("Failed to send gift signal to {}: {}", ev.conversation_id, e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::{OutboundAction, RecordingGate};
    use mock_model::{FailingModel, ScriptedModel};

    const NOW: i64 = 1_700_000_000;

    async fn setup(model: Arc<dyn LanguageModel>) -> (Orchestrator, Database, Arc<RecordingGate>) {
        let db = Database::connect_in_memory().await.unwrap();
        let gate = Arc::new(RecordingGate::new());
        let engine = Orchestrator::new(db.clone(), model, gate.clone(), EngineConfig::for_tests());
        (engine, db, gate)
    }

    /// Create the user and burn the one-time feature reminder, so default
    /// branch tests are not short-circuited by it.
    async fn seed_reminded(db: &Database, user_id: &str) {
        profile::upsert_on_inbound(db.pool(), user_id, user_id, None, NOW - 100)
            .await
            .unwrap();
        profile::mark_stats_reminder(db.pool(), user_id, NOW - 100)
            .await
            .unwrap();
    }

    async fn quota_used(db: &Database, user_id: &str) -> i64 {
        profile::require_profile(db.pool(), user_id)
            .await
            .unwrap()
            .daily_free_quota_used
    }

    #[tokio::test]
    async fn test_first_contact_gets_feature_reminder() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, gate) = setup(model.clone()).await;

        let msg = TextMessage::direct("42", "привет!");
        engine.process_text_at(&msg, NOW).await.unwrap();

        assert_eq!(gate.texts(), vec![prompts::STATS_REMINDER.to_string()]);
        assert_eq!(model.call_count(), 0);

        // The next message goes to the model.
        engine.process_text_at(&msg, NOW + 10).await.unwrap();
        assert_eq!(model.call_count(), 1);
        assert_eq!(
            conversation::turn_count(db.pool(), "42").await.unwrap(),
            4
        );
    }

    #[tokio::test]
    async fn test_stats_request_never_calls_model() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, gate) = setup(model.clone()).await;
        seed_reminded(&db, "42").await;
        drinks::insert_event(db.pool(), "42", "пиво", 2, "бутылок", NOW - 10)
            .await
            .unwrap();

        engine
            .process_text_at(&TextMessage::direct("42", "Покажи статистику"), NOW)
            .await
            .unwrap();

        assert_eq!(model.call_count(), 0);
        let texts = gate.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("пиво: 2 бутылок"));
        assert!(gate.signals().is_empty());
    }

    #[tokio::test]
    async fn test_stats_request_records_no_drink_event() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, gate) = setup(model.clone()).await;
        seed_reminded(&db, "42").await;

        // "сколько выпил" contains the consumption trigger (and "7" parses
        // as an amount); the stats branch must win before extraction runs.
        engine
            .process_text_at(&TextMessage::direct("42", "сколько выпил за 7 дней?"), NOW)
            .await
            .unwrap();

        let week = drinks::totals_since(db.pool(), "42", NOW - 7 * DAY_SECS)
            .await
            .unwrap();
        assert!(week.is_empty());
        assert_eq!(model.call_count(), 0);

        let texts = gate.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Пока ничего не выпито"));
    }

    #[tokio::test]
    async fn test_age_statement_stored() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, _gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine
            .process_text_at(&TextMessage::direct("42", "Мне 25 лет"), NOW)
            .await
            .unwrap();

        let user = profile::require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(user.age_hint, Some(25));
    }

    #[tokio::test]
    async fn test_preferences_accumulate_dedup() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, _gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine
            .process_text_at(&TextMessage::direct("42", "люблю пиво"), NOW)
            .await
            .unwrap();
        engine
            .process_text_at(&TextMessage::direct("42", "обожаю виски и пиво"), NOW + 10)
            .await
            .unwrap();

        let user = profile::require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(user.preference_tags.as_deref(), Some("пиво, виски"));
    }

    #[tokio::test]
    async fn test_drink_reply_emits_signal_and_consumes_quota() {
        let model = Arc::new(ScriptedModel::with_replies(["Ну что, выпьем?"]));
        let (engine, db, gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine
            .process_text_at(&TextMessage::direct("42", "скучно"), NOW)
            .await
            .unwrap();

        assert_eq!(gate.signals(), vec![SideSignal::Beer]);
        assert_eq!(quota_used(&db, "42").await, 1);

        let turns = conversation::recent_turns(db.pool(), "42", 10).await.unwrap();
        assert_eq!(turns.last().unwrap().side_signal.as_deref(), Some("drink_beer"));
    }

    #[tokio::test]
    async fn test_quota_exhaustion_swaps_signal_for_gift_offer() {
        let model = Arc::new(ScriptedModel::with_replies(vec!["Выпьем!"; 6]));
        let (engine, db, gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        for i in 0..6 {
            engine
                .process_text_at(&TextMessage::direct("42", "давай"), NOW + i)
                .await
                .unwrap();
        }

        // Five free drinks, then the offer instead of a sixth signal.
        assert_eq!(gate.signals().len(), 5);
        assert_eq!(quota_used(&db, "42").await, 5);
        let offers: Vec<_> = gate
            .actions()
            .into_iter()
            .filter(|a| matches!(a, OutboundAction::GiftOffer { .. }))
            .collect();
        assert_eq!(offers.len(), 1);
        if let OutboundAction::GiftOffer { item_codes, .. } = &offers[0] {
            assert_eq!(item_codes.len(), CATALOG.len());
        }
    }

    #[tokio::test]
    async fn test_mood_signal_is_quota_free() {
        let model = Arc::new(ScriptedModel::with_replies(["Мне тоже грустно..."]));
        let (engine, db, gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine
            .process_text_at(&TextMessage::direct("42", "плохой день"), NOW)
            .await
            .unwrap();

        assert_eq!(gate.signals(), vec![SideSignal::Sad]);
        assert_eq!(quota_used(&db, "42").await, 0);
    }

    #[tokio::test]
    async fn test_model_failure_uses_fallback_reply() {
        let (engine, db, gate) = setup(Arc::new(FailingModel::new())).await;
        seed_reminded(&db, "42").await;

        engine
            .process_text_at(&TextMessage::direct("42", "привет"), NOW)
            .await
            .unwrap();

        assert_eq!(gate.texts(), vec![prompts::FALLBACK_REPLY.to_string()]);
        // The fallback is still logged verbatim as the agent turn.
        let turns = conversation::recent_turns(db.pool(), "42", 10).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, prompts::FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_overuse_warning_once_per_day() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, gate) = setup(model.clone()).await;
        seed_reminded(&db, "42").await;
        drinks::insert_event(db.pool(), "42", "водка", 10, "порций", NOW - 10)
            .await
            .unwrap();

        engine
            .process_text_at(&TextMessage::direct("42", "наливай еще"), NOW)
            .await
            .unwrap();
        assert_eq!(model.call_count(), 0);
        assert_eq!(gate.texts(), vec![prompts::overuse_warning(10)]);

        // Already warned today: the next message takes the default path.
        engine
            .process_text_at(&TextMessage::direct("42", "ну и ладно"), NOW + 10)
            .await
            .unwrap();
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_one_turn_pair_per_inbound() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, _gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        for i in 0..3 {
            engine
                .process_text_at(&TextMessage::direct("42", "сообщение"), NOW + i)
                .await
                .unwrap();
        }

        assert_eq!(conversation::turn_count(db.pool(), "42").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_gender_inferred_once_from_name() {
        let model = Arc::new(ScriptedModel::with_replies([
            "female",
            "Привет, Маша!",
            "Как дела?",
        ]));
        let (engine, db, _gate) = setup(model.clone()).await;
        seed_reminded(&db, "42").await;

        let msg = TextMessage {
            user_id: "42".into(),
            conversation_id: "42".into(),
            display_name: Some("Маша".into()),
            text: "привет".into(),
        };
        engine.process_text_at(&msg, NOW).await.unwrap();

        let user = profile::require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(user.gender, Gender::Female);
        assert_eq!(model.call_count(), 2);

        // Known gender: no second inference call.
        engine.process_text_at(&msg, NOW + 10).await.unwrap();
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_internal_failure_still_replies() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, db, gate) = setup(model).await;
        db.close().await;

        engine
            .process_text_at(&TextMessage::direct("42", "привет"), NOW)
            .await
            .unwrap();

        assert_eq!(gate.texts(), vec![prompts::APOLOGY_REPLY.to_string()]);
    }

    #[tokio::test]
    async fn test_gift_selection_sends_invoice() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, _db, gate) = setup(model).await;

        engine
            .handle_gift_selected(&GiftSelected {
                user_id: "42".into(),
                conversation_id: "42".into(),
                callback_id: "cb-1".into(),
                item_code: "wine".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            gate.actions(),
            vec![
                OutboundAction::CallbackAnswer {
                    callback_id: "cb-1".into()
                },
                OutboundAction::Invoice {
                    conversation_id: "42".into(),
                    item_code: "wine".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_gift_selection_unknown_code() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, _db, gate) = setup(model).await;

        engine
            .handle_gift_selected(&GiftSelected {
                user_id: "42".into(),
                conversation_id: "42".into(),
                callback_id: "cb-2".into(),
                item_code: "mead".into(),
            })
            .await
            .unwrap();

        assert_eq!(gate.texts(), vec![prompts::UNKNOWN_GIFT.to_string()]);
        assert!(gate
            .actions()
            .iter()
            .all(|a| !matches!(a, OutboundAction::Invoice { .. })));
    }

    #[tokio::test]
    async fn test_pre_checkout_answers() {
        let model = Arc::new(ScriptedModel::new());
        let (engine, _db, gate) = setup(model).await;

        engine
            .handle_pre_checkout(&PreCheckout {
                query_id: "q1".into(),
                user_id: "42".into(),
                payload: "gift:wine".into(),
                amount: 250,
                currency: "XTR".into(),
            })
            .await
            .unwrap();
        engine
            .handle_pre_checkout(&PreCheckout {
                query_id: "q2".into(),
                user_id: "42".into(),
                payload: "gift:wine".into(),
                amount: 100,
                currency: "XTR".into(),
            })
            .await
            .unwrap();

        let answers: Vec<_> = gate
            .actions()
            .into_iter()
            .filter_map(|a| match a {
                OutboundAction::PreCheckoutAnswer { query_id, ok, .. } => Some((query_id, ok)),
                _ => None,
            })
            .collect();
        assert_eq!(answers, vec![("q1".to_string(), true), ("q2".to_string(), false)]);
    }

    fn payment(charge_id: &str) -> PaymentConfirmed {
        PaymentConfirmed {
            user_id: "42".into(),
            conversation_id: "42".into(),
            charge_id: charge_id.into(),
            payload: "gift:wine".into(),
            amount: 250,
            currency: "XTR".into(),
            raw: serde_json::json!({"ok": true}),
        }
    }

    #[tokio::test]
    async fn test_payment_thanks_then_signal() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Вау!\nСпасибо!\nТы лучший!\nОбожаю!\nЗа тебя!",
        ]));
        let (engine, db, gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine.handle_payment_at(&payment("charge-1"), NOW).await.unwrap();

        assert_eq!(gate.texts().len(), 5);
        assert_eq!(gate.signals(), vec![SideSignal::Wine]);
        // A purchase never touches the free quota.
        assert_eq!(quota_used(&db, "42").await, 0);
        assert!(gifts::get_by_charge_id(db.pool(), "charge-1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_payment_replay_is_silent() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Вау!\nСпасибо!\nТы лучший!\nОбожаю!\nЗа тебя!",
        ]));
        let (engine, db, gate) = setup(model).await;
        seed_reminded(&db, "42").await;

        engine.handle_payment_at(&payment("charge-2"), NOW).await.unwrap();
        let after_first = gate.actions().len();

        engine.handle_payment_at(&payment("charge-2"), NOW + 5).await.unwrap();
        assert_eq!(gate.actions().len(), after_first);
    }

    #[tokio::test]
    async fn test_payment_gratitude_fallback_on_model_failure() {
        let (engine, db, gate) = setup(Arc::new(FailingModel::new())).await;
        seed_reminded(&db, "42").await;

        engine.handle_payment_at(&payment("charge-3"), NOW).await.unwrap();

        let expected: Vec<String> = prompts::FALLBACK_THANKS.iter().map(|s| s.to_string()).collect();
        assert_eq!(gate.texts(), expected);
        assert_eq!(gate.signals(), vec![SideSignal::Wine]);
    }
}
