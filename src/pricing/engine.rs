//! The premium pricing engine (spec §4.4).

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogHandle;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::money::{round_half_up, safe_div};
use crate::policy::calculation_log::PremiumCalculationLog;
use crate::policy::config::PolicyConfig;
use crate::policy::member::PolicyMember;
use crate::policy::selection::PolicyTcSelection;
use crate::policy::store::PolicyConfigStore;
use crate::policy::workflow::ApprovalWorkflow;
use crate::types::{ApprovalStepStatus, BenefitCategory, Gender, MemberStatus, MemberType, PolicyStatus, PricingMethod};

/// One row of a bulk member import (spec §4.4.7).
#[derive(Debug, Clone, Deserialize)]
pub struct MemberImportRow {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub member_type: String,
}

/// Result of `PricingEngine::import_members`: created rows and per-row
/// failures, indexed against the input.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberImportOutcome {
    pub created: Vec<PolicyMember>,
    pub errors: Vec<(usize, String)>,
}

/// A point-in-time, presentation-ready summary of a config's pricing,
/// built for the quote document (spec §6 `GET .../quote`, SPEC_FULL §11).
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSnapshot {
    pub quote_number: String,
    pub group_name: String,
    pub participant_count: i64,
    pub base_premium_total: Decimal,
    pub total_multiplier: Decimal,
    pub adjusted_premium: Decimal,
    pub admin_fee: Decimal,
    pub tpa_fee: Decimal,
    pub total_premium: Decimal,
    pub monthly_premium: Decimal,
    pub per_member_average: Decimal,
    pub selected_categories: Vec<BenefitCategory>,
    pub tc_impact_labels: Vec<(String, String)>,
}

/// Computes premium breakdowns, initializes defaults, validates a
/// configuration for submission, constructs the approval workflow,
/// advances approvals, and emits quote snapshots.
pub struct PricingEngine {
    catalog: CatalogHandle,
    store: Arc<dyn PolicyConfigStore>,
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(catalog: CatalogHandle, store: Arc<dyn PolicyConfigStore>, config: EngineConfig) -> Self {
        Self { catalog, store, config }
    }

    /// Create a DRAFT config with default benefit selections and default
    /// T&C selections populated from the catalog (spec §4.4.1).
    pub fn create_config(
        &self,
        group_name: impl Into<String>,
        coverage_start: NaiveDate,
        coverage_end: NaiveDate,
        pricing_method: PricingMethod,
        at: NaiveDateTime,
    ) -> EngineResult<PolicyConfig> {
        let quote_number = self.store.next_quote_number(at.date())?;
        let mut policy_config =
            PolicyConfig::new(quote_number, group_name, coverage_start, coverage_end, pricing_method, at)?;

        let catalog = self.catalog.snapshot();
        for factor in catalog.active_tc_factors() {
            let option = catalog
                .tc_factor_default_option(&factor.factor_code)
                .or_else(|| catalog.tc_factor_options(&factor.factor_code).first())
                .ok_or_else(|| EngineError::dependency_missing(format!("no options for T&C factor {}", factor.factor_code)))?;
            let selection =
                PolicyTcSelection::new(factor.factor_code.clone(), option.option_value.clone(), option.multiplier)?;
            policy_config.upsert_tc_selection(selection, at);
        }

        self.store.insert(policy_config.clone())?;
        Ok(policy_config)
    }

    fn active_member_count(&self, quote_number: &str) -> EngineResult<i64> {
        let members = self.store.members_for(quote_number)?;
        Ok(members.iter().filter(|m| m.is_active()).count() as i64)
    }

    /// Category factor per spec §4.4.2: small-group loading, plus a
    /// maternity demographic loading on top for MATERNITY.
    fn category_factor(&self, category: BenefitCategory, members: &[PolicyMember], as_of: NaiveDate) -> Decimal {
        let active: Vec<&PolicyMember> = members.iter().filter(|m| m.is_active()).collect();
        let participant_count = active.len() as i64;
        let mut factor = self.config.small_group_multiplier(participant_count);

        if category == BenefitCategory::Maternity && participant_count > 0 {
            let eligible = active
                .iter()
                .filter(|m| {
                    m.gender == Gender::Female
                        && m.age_on(as_of).map(|age| (18..=45).contains(&age)).unwrap_or(false)
                })
                .count();
            let fraction = Decimal::from(eligible as i64) / Decimal::from(participant_count);
            if fraction > self.config.maternity_female_fraction_threshold {
                factor *= self.config.maternity_loading_multiplier;
            }
        }

        factor
    }

    /// Toggle a benefit category on or off, recomputing its factor and the
    /// total premium (spec §4.4.2).
    pub fn set_benefit_selected(
        &self,
        quote_number: &str,
        category: BenefitCategory,
        selected: bool,
        at: NaiveDateTime,
    ) -> EngineResult<PolicyConfig> {
        let mut policy_config = self.store.get(quote_number)?;
        let members = self.store.members_for(quote_number)?;
        let factor = if selected {
            self.category_factor(category, &members, policy_config.coverage_start)
        } else {
            Decimal::ONE
        };

        let selection = policy_config
            .selection_for_mut(category)
            .ok_or_else(|| EngineError::not_found("BenefitSelection", category.to_string()))?;
        selection.selected = selected;
        selection.category_factor = factor;
        policy_config.updated_at = at;

        self.store.update(policy_config)?;
        self.calculate_total_premium(quote_number, at, false)
    }

    /// Change a T&C selection, enforcing participant-count bounds (spec
    /// §4.4.5).
    pub fn update_tc_selection(
        &self,
        quote_number: &str,
        factor_code: &str,
        option_value: &str,
        at: NaiveDateTime,
    ) -> EngineResult<PolicyConfig> {
        let mut policy_config = self.store.get(quote_number)?;
        let participant_count = self.active_member_count(quote_number)?;

        let catalog = self.catalog.snapshot();
        let option = catalog
            .tc_factor_option(factor_code, option_value)
            .ok_or_else(|| EngineError::not_found("TcFactorOption", format!("{factor_code}:{option_value}")))?;

        if let Some(bound) = option.violated_bound(participant_count) {
            return Err(EngineError::validation(format!(
                "T&C option {option_value} violates {bound} for {participant_count} participants"
            )));
        }

        let selection = PolicyTcSelection::new(factor_code, option_value, option.multiplier)?;
        policy_config.upsert_tc_selection(selection, at);
        self.store.update(policy_config)?;
        self.calculate_total_premium(quote_number, at, false)
    }

    /// Add a single member and recompute premium (spec §4.4.3, §4.4.7).
    pub fn add_member(&self, quote_number: &str, member: PolicyMember, at: NaiveDateTime) -> EngineResult<PolicyConfig> {
        self.store.add_member(member)?;
        self.calculate_total_premium(quote_number, at, false)
    }

    /// Bulk member import: each row is added independently; failures are
    /// collected without aborting the batch (spec §4.4.7).
    pub fn import_members(
        &self,
        quote_number: &str,
        rows: Vec<MemberImportRow>,
        at: NaiveDateTime,
    ) -> EngineResult<MemberImportOutcome> {
        let mut outcome = MemberImportOutcome::default();
        let mut next_sequence = self.store.members_for(quote_number)?.len() + 1;

        for (index, row) in rows.into_iter().enumerate() {
            match self.build_member_from_row(quote_number, next_sequence, &row) {
                Ok(member) => match self.store.add_member(member.clone()) {
                    Ok(()) => {
                        next_sequence += 1;
                        outcome.created.push(member);
                    }
                    Err(err) => outcome.errors.push((index, err.to_string())),
                },
                Err(err) => outcome.errors.push((index, err.to_string())),
            }
        }

        if !outcome.created.is_empty() {
            self.calculate_total_premium(quote_number, at, false)?;
        }
        Ok(outcome)
    }

    fn build_member_from_row(&self, quote_number: &str, sequence: usize, row: &MemberImportRow) -> EngineResult<PolicyMember> {
        let gender: Gender = row.gender.parse().map_err(EngineError::validation)?;
        let member_type: MemberType = row.member_type.parse().map_err(EngineError::validation)?;
        let member_id = format!("{quote_number}-M{sequence:04}");
        PolicyMember::new(member_id, quote_number, member_type, row.date_of_birth, gender, MemberStatus::Active)
    }

    /// Recompute and persist a config's premium breakdown (spec §4.4.3,
    /// §4.4.4). When `save` is true, an audit log row is appended.
    pub fn calculate_total_premium(&self, quote_number: &str, at: NaiveDateTime, save: bool) -> EngineResult<PolicyConfig> {
        let mut policy_config = self.store.get(quote_number)?;
        let mut members = self.store.members_for(quote_number)?;
        let catalog = self.catalog.snapshot();
        let as_of = policy_config.coverage_start;

        let mut base_premium_total = Decimal::ZERO;
        for member in members.iter_mut().filter(|m| m.is_active()) {
            let rating_gender = member.rating_gender_on(as_of)?;
            let age = member.age_on(as_of)?;
            let mut member_premium = Decimal::ZERO;
            let mut band_label = None;

            for category in BenefitCategory::ALL {
                let is_selected = policy_config.selection_for(category).map(|s| s.selected).unwrap_or(false);
                if !is_selected {
                    continue;
                }
                let Some(template) = catalog.template_for_category(category, as_of) else { continue };
                let base_rate = template.base_rate_for(rating_gender);
                let multiplier = catalog.age_band_multiplier(&template.template_code, age, rating_gender);
                member_premium += base_rate * multiplier;
                if multiplier != Decimal::ONE {
                    band_label = Some(format!("{}:{:?}@{}", template.template_code, rating_gender, age));
                }
            }

            member.record_premium(member_premium, band_label);
            self.store.update_member(member.clone())?;
            base_premium_total += member_premium;
        }

        let participant_count = members.iter().filter(|m| m.is_active()).count() as i64;

        let mut total_multiplier = Decimal::ONE;
        for category in BenefitCategory::ALL {
            let selected = policy_config.selection_for(category).map(|s| s.selected).unwrap_or(false);
            if !selected {
                continue;
            }
            let factor = self.category_factor(category, &members, as_of);
            if let Some(selection) = policy_config.selection_for_mut(category) {
                selection.category_factor = factor;
            }
            total_multiplier *= factor;
        }
        for tc in &policy_config.tc_selections {
            total_multiplier *= tc.applied_multiplier;
        }

        let adjusted_premium = base_premium_total * total_multiplier;
        let admin_fee = self.config.admin_fee_floor.max(self.config.admin_fee_rate * adjusted_premium);
        let tpa_fee = self
            .config
            .tpa_fee_floor
            .max(self.config.tpa_fee_per_participant * Decimal::from(participant_count));
        let total_premium = round_half_up(adjusted_premium + admin_fee + tpa_fee, 2);

        policy_config.base_premium_total = base_premium_total;
        policy_config.total_multiplier = total_multiplier;
        policy_config.adjusted_premium = adjusted_premium;
        policy_config.admin_fee = admin_fee;
        policy_config.tpa_fee = tpa_fee;
        policy_config.total_premium = total_premium;
        policy_config.updated_at = at;
        self.store.update(policy_config.clone())?;

        if save {
            let log = PremiumCalculationLog::new(
                quote_number,
                at,
                base_premium_total,
                total_multiplier,
                adjusted_premium,
                admin_fee,
                tpa_fee,
                total_premium,
                participant_count,
            );
            self.store.record_calculation_log(log)?;
        }

        Ok(policy_config)
    }

    /// Submit a DRAFT config for quoting (spec §4.4.6). Preconditions are
    /// checked in order and the first violation is surfaced.
    pub fn submit_for_quote(&self, quote_number: &str, at: NaiveDateTime) -> EngineResult<PolicyConfig> {
        let policy_config = self.store.get(quote_number)?;
        if policy_config.status != PolicyStatus::Draft {
            return Err(EngineError::state("PolicyConfig", quote_number, "DRAFT", policy_config.status.to_string()));
        }

        let members = self.store.members_for(quote_number)?;
        let active_count = members.iter().filter(|m| m.is_active()).count() as i64;
        if active_count < self.config.minimum_participants_for_submission {
            return Err(EngineError::validation(format!(
                "Minimum {} participants required",
                self.config.minimum_participants_for_submission
            )));
        }
        if !policy_config.benefit_selections.iter().any(|s| s.selected) {
            return Err(EngineError::validation("At least one benefit category must be selected"));
        }
        if active_count == 0 {
            return Err(EngineError::validation("At least one ACTIVE member is required"));
        }

        let mut policy_config = self.calculate_total_premium(quote_number, at, true)?;
        policy_config.transition_to(PolicyStatus::Quoted, at)?;
        self.store.update(policy_config.clone())?;

        let steps = ApprovalWorkflow::required_steps(quote_number, policy_config.adjusted_premium);
        self.store.create_approval_workflow(steps)?;

        Ok(policy_config)
    }

    /// Decide one approval step (spec §4.4.6). When no PENDING steps
    /// remain after an approval, the config advances to APPROVED and a
    /// policy_number is minted.
    pub fn decide_approval_step(
        &self,
        quote_number: &str,
        tier: crate::policy::workflow::ApprovalTier,
        status: ApprovalStepStatus,
        approver: impl Into<String>,
        comments: Option<String>,
        at: NaiveDateTime,
    ) -> EngineResult<PolicyConfig> {
        let mut steps = self.store.approval_workflow(quote_number)?;
        let step = steps
            .iter_mut()
            .find(|s| s.tier == tier)
            .ok_or_else(|| EngineError::not_found("ApprovalWorkflow", quote_number))?;
        step.decide(status, approver, at, comments)?;
        self.store.update_approval_step(step.clone())?;

        let mut policy_config = self.store.get(quote_number)?;
        let all_steps = self.store.approval_workflow(quote_number)?;
        let none_pending = all_steps.iter().all(|s| s.status != ApprovalStepStatus::Pending);
        if none_pending && status == ApprovalStepStatus::Approved {
            let all_approved = all_steps.iter().all(|s| s.status == ApprovalStepStatus::Approved);
            if all_approved {
                policy_config.transition_to(PolicyStatus::Approved, at)?;
                policy_config.policy_number = Some(self.store.next_policy_number(at.date())?);
                self.store.update(policy_config.clone())?;
            }
        }

        Ok(policy_config)
    }

    /// Build a presentation-ready snapshot for the quote document (spec §6
    /// `GET .../quote`, SPEC_FULL §11).
    pub fn build_quote_snapshot(&self, quote_number: &str) -> EngineResult<QuoteSnapshot> {
        let policy_config = self.store.get(quote_number)?;
        let participant_count = self.active_member_count(quote_number)?;

        let selected_categories = BenefitCategory::ALL
            .into_iter()
            .filter(|c| policy_config.selection_for(*c).map(|s| s.selected).unwrap_or(false))
            .collect();
        let tc_impact_labels = policy_config
            .tc_selections
            .iter()
            .map(|s| (s.factor_code.clone(), s.impact_label()))
            .collect();

        Ok(QuoteSnapshot {
            quote_number: policy_config.quote_number.clone(),
            group_name: policy_config.group_name.clone(),
            participant_count,
            base_premium_total: policy_config.base_premium_total,
            total_multiplier: policy_config.total_multiplier,
            adjusted_premium: policy_config.adjusted_premium,
            admin_fee: policy_config.admin_fee,
            tpa_fee: policy_config.tpa_fee,
            total_premium: policy_config.total_premium,
            monthly_premium: safe_div(policy_config.total_premium, Decimal::from(12)),
            per_member_average: safe_div(policy_config.total_premium, Decimal::from(participant_count)),
            selected_categories,
            tc_impact_labels,
        })
    }
}
