// Rust guideline compliant 2026-10-16

//! Output formatting module for the Helpmate CLI.
//!
//! This module renders marketplace records as JSON envelopes, tables or
//! plain text.

use chrono::DateTime;
use helpmate_app::{
    AppError, BookingTimeline, DeclineReceipt, ErrorEnvelope, PaymentReceipt, Reconciliation,
    SuccessEnvelope,
};
use helpmate_core::{
    Booking, Dispute, EarningsSummary, HelperProfile, Message, OutputFormat, Payment,
    RankedCandidate, Review,
};
use serde::Serialize;
use serde_json::json;
use tabled::{builder::Builder, settings::Style};

/// Output formatter trait.
///
/// Defines how each kind of command result is rendered.
pub trait OutputFormatter {
    /// Formats one booking.
    fn format_booking(&self, booking: &Booking) -> String;

    /// Formats a list of bookings.
    fn format_bookings(&self, bookings: &[Booking]) -> String;

    /// Formats a booking with its events, messages and payments.
    fn format_timeline(&self, timeline: &BookingTimeline) -> String;

    /// Formats a decline receipt.
    fn format_decline(&self, receipt: &DeclineReceipt) -> String;

    /// Formats a chat message.
    fn format_message(&self, message: &Message) -> String;

    /// Formats a review.
    fn format_review(&self, review: &Review) -> String;

    /// Formats one payment.
    fn format_payment(&self, payment: &Payment) -> String;

    /// Formats a recorded payment and the booking it settled.
    fn format_receipt(&self, receipt: &PaymentReceipt) -> String;

    /// Formats a gateway reconciliation outcome.
    fn format_reconciliation(&self, outcome: &Reconciliation) -> String;

    /// Formats a helper profile.
    fn format_helper(&self, helper: &HelperProfile) -> String;

    /// Formats a ranked helper list.
    fn format_ranking(&self, ranked: &[RankedCandidate]) -> String;

    /// Formats an earnings summary.
    fn format_earnings(&self, helper_id: &str, summary: &EarningsSummary) -> String;

    /// Formats one dispute.
    fn format_dispute(&self, dispute: &Dispute) -> String;

    /// Formats a list of disputes.
    fn format_disputes(&self, disputes: &[Dispute]) -> String;

    /// Formats an error for display.
    fn format_error(&self, error: &anyhow::Error) -> String;
}

/// Renders a Unix timestamp as UTC.
pub fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn optional(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn price_range(booking: &Booking) -> String {
    match (booking.price_estimate.min, booking.price_estimate.max) {
        (Some(min), Some(max)) => format!("{} - {}", format_money(min), format_money(max)),
        (Some(min), None) => format!(">= {}", format_money(min)),
        (None, Some(max)) => format!("<= {}", format_money(max)),
        (None, None) => "-".to_string(),
    }
}

/// JSON output formatter.
///
/// Wraps every result in a success envelope and every error in an error
/// envelope.
pub struct JsonFormatter;

impl JsonFormatter {
    fn envelope<T: Serialize>(value: T) -> String {
        serde_json::to_string_pretty(&SuccessEnvelope::new(value)).unwrap_or_else(|_| {
            json!({ "status": "error", "message": "Failed to serialize result" }).to_string()
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_booking(&self, booking: &Booking) -> String {
        Self::envelope(booking)
    }

    fn format_bookings(&self, bookings: &[Booking]) -> String {
        Self::envelope(json!({ "bookings": bookings, "total": bookings.len() }))
    }

    fn format_timeline(&self, timeline: &BookingTimeline) -> String {
        Self::envelope(timeline)
    }

    fn format_decline(&self, receipt: &DeclineReceipt) -> String {
        Self::envelope(receipt)
    }

    fn format_message(&self, message: &Message) -> String {
        Self::envelope(message)
    }

    fn format_review(&self, review: &Review) -> String {
        Self::envelope(review)
    }

    fn format_payment(&self, payment: &Payment) -> String {
        Self::envelope(payment)
    }

    fn format_receipt(&self, receipt: &PaymentReceipt) -> String {
        Self::envelope(receipt)
    }

    fn format_reconciliation(&self, outcome: &Reconciliation) -> String {
        Self::envelope(outcome)
    }

    fn format_helper(&self, helper: &HelperProfile) -> String {
        Self::envelope(helper)
    }

    fn format_ranking(&self, ranked: &[RankedCandidate]) -> String {
        Self::envelope(json!({ "candidates": ranked, "total": ranked.len() }))
    }

    fn format_earnings(&self, helper_id: &str, summary: &EarningsSummary) -> String {
        Self::envelope(json!({ "helper_id": helper_id, "earnings": summary }))
    }

    fn format_dispute(&self, dispute: &Dispute) -> String {
        Self::envelope(dispute)
    }

    fn format_disputes(&self, disputes: &[Dispute]) -> String {
        Self::envelope(json!({ "disputes": disputes, "total": disputes.len() }))
    }

    fn format_error(&self, error: &anyhow::Error) -> String {
        let envelope = match error.downcast_ref::<AppError>() {
            Some(app_error) => serde_json::to_value(ErrorEnvelope::from_error(app_error)),
            None => Ok(json!({ "status": "error", "message": error.to_string() })),
        };
        envelope
            .map(|value| value.to_string())
            .unwrap_or_else(|_| json!({ "status": "error" }).to_string())
    }
}

/// Table output formatter.
///
/// Formats records as human-readable tables and labelled fields.
pub struct TableFormatter;

impl TableFormatter {
    fn table(header: &[&str], rows: Vec<Vec<String>>) -> String {
        let mut builder = Builder::default();
        builder.push_record(header.iter().map(|h| h.to_string()));
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern());
        table.to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_booking(&self, booking: &Booking) -> String {
        let mut output = String::new();
        output.push_str(&format!("ID:        {}\n", booking.id));
        output.push_str(&format!("Status:    {}\n", booking.status));
        output.push_str(&format!("Customer:  {}\n", booking.customer_id));
        output.push_str(&format!("Helper:    {}\n", optional(booking.helper_id())));
        output.push_str(&format!("Category:  {}\n", booking.category_id));
        output.push_str(&format!("Address:   {}\n", booking.address_id));
        output.push_str(&format!("Estimate:  {}\n", price_range(booking)));
        if let Some(scheduled_at) = booking.scheduled_at {
            output.push_str(&format!("Scheduled: {}\n", format_timestamp(scheduled_at)));
        }
        if let Some(notes) = &booking.notes {
            output.push_str(&format!("Notes:     {}\n", notes));
        }
        output.push_str(&format!("Created:   {}\n", format_timestamp(booking.created_at)));
        output.push_str(&format!("Updated:   {}\n", format_timestamp(booking.updated_at)));
        output.push_str(&format!("Version:   {}\n", booking.version));
        output
    }

    fn format_bookings(&self, bookings: &[Booking]) -> String {
        if bookings.is_empty() {
            return "No bookings found.".to_string();
        }
        let rows = bookings
            .iter()
            .map(|b| {
                vec![
                    b.id.clone(),
                    b.status.to_string(),
                    b.customer_id.clone(),
                    optional(b.helper_id()).to_string(),
                    b.category_id.clone(),
                    format_timestamp(b.created_at),
                ]
            })
            .collect();
        Self::table(
            &["ID", "Status", "Customer", "Helper", "Category", "Created"],
            rows,
        )
    }

    fn format_timeline(&self, timeline: &BookingTimeline) -> String {
        let mut output = self.format_booking(&timeline.booking);

        if !timeline.events.is_empty() {
            let rows = timeline
                .events
                .iter()
                .map(|e| {
                    vec![
                        format_timestamp(e.created_at),
                        e.kind.action().to_string(),
                        e.actor_id.clone(),
                        e.from_status.map_or("-".to_string(), |s| s.to_string()),
                        e.to_status.map_or("-".to_string(), |s| s.to_string()),
                    ]
                })
                .collect();
            output.push_str("\nEvents:\n");
            output.push_str(&Self::table(&["At", "Event", "Actor", "From", "To"], rows));
            output.push('\n');
        }

        if !timeline.messages.is_empty() {
            let rows = timeline
                .messages
                .iter()
                .map(|m| {
                    vec![
                        format_timestamp(m.created_at),
                        m.sender_id.clone(),
                        m.body.clone(),
                    ]
                })
                .collect();
            output.push_str("\nMessages:\n");
            output.push_str(&Self::table(&["At", "From", "Message"], rows));
            output.push('\n');
        }

        if !timeline.payments.is_empty() {
            let rows = timeline
                .payments
                .iter()
                .map(|p| {
                    vec![
                        p.id.clone(),
                        format!("{:?}", p.method).to_lowercase(),
                        p.status.to_string(),
                        p.escrow_status.to_string(),
                        format_money(p.amount),
                    ]
                })
                .collect();
            output.push_str("\nPayments:\n");
            output.push_str(&Self::table(
                &["ID", "Method", "Status", "Escrow", "Amount"],
                rows,
            ));
            output.push('\n');
        }

        output
    }

    fn format_decline(&self, receipt: &DeclineReceipt) -> String {
        format!(
            "Declined booking {} as {}",
            receipt.booking_id, receipt.helper_id
        )
    }

    fn format_message(&self, message: &Message) -> String {
        format!(
            "Message {} sent on {}\n  {}",
            message.id, message.booking_id, message.body
        )
    }

    fn format_review(&self, review: &Review) -> String {
        let mut output = format!(
            "Review {}: {}/5 for {}",
            review.id, review.rating, review.helper_id
        );
        if let Some(comment) = &review.comment {
            output.push_str(&format!("\n  {}", comment));
        }
        output
    }

    fn format_payment(&self, payment: &Payment) -> String {
        let mut output = String::new();
        output.push_str(&format!("ID:        {}\n", payment.id));
        output.push_str(&format!("Booking:   {}\n", payment.booking_id));
        output.push_str(&format!("Method:    {:?}\n", payment.method));
        output.push_str(&format!("Status:    {}\n", payment.status));
        output.push_str(&format!("Escrow:    {}\n", payment.escrow_status));
        output.push_str(&format!("Amount:    {}\n", format_money(payment.amount)));
        if let Some(provider_ref) = &payment.provider_ref {
            output.push_str(&format!("Reference: {}\n", provider_ref));
        }
        if let Some(held_at) = payment.escrow_held_at {
            output.push_str(&format!("Held:      {}\n", format_timestamp(held_at)));
        }
        if let Some(released_at) = payment.escrow_released_at {
            output.push_str(&format!("Released:  {}\n", format_timestamp(released_at)));
        }
        output
    }

    fn format_receipt(&self, receipt: &PaymentReceipt) -> String {
        format!(
            "{}\nBooking {} is {}",
            self.format_payment(&receipt.payment),
            receipt.booking.id,
            receipt.booking.status
        )
    }

    fn format_reconciliation(&self, outcome: &Reconciliation) -> String {
        match outcome {
            Reconciliation::UnknownReference { provider_ref } => {
                format!("No payment found for reference {}", provider_ref)
            }
            Reconciliation::Unchanged { payment } => {
                format!("Payment {} already {}", payment.id, payment.status)
            }
            Reconciliation::Updated { payment, booking } => {
                let mut output = format!("Payment {} is now {}", payment.id, payment.status);
                if let Some(booking) = booking {
                    output.push_str(&format!("\nBooking {} is now {}", booking.id, booking.status));
                }
                output
            }
        }
    }

    fn format_helper(&self, helper: &HelperProfile) -> String {
        let mut output = String::new();
        output.push_str(&format!("ID:           {}\n", helper.id));
        output.push_str(&format!("Active:       {}\n", helper.is_active));
        output.push_str(&format!("Available:    {}\n", helper.is_available));
        output.push_str(&format!("Verification: {:?}\n", helper.verification));
        output.push_str(&format!("Services:     {}\n", helper.services.join(", ")));
        output.push_str(&format!("Areas:        {}\n", helper.service_areas.join(", ")));
        output.push_str(&format!("Base price:   {}\n", format_money(helper.base_price)));
        output.push_str(&format!(
            "Rating:       {:.2} ({} reviews)\n",
            helper.rating_avg, helper.rating_count
        ));
        output.push_str(&format!("Reliability:  {}\n", helper.reliability_score));
        output
    }

    fn format_ranking(&self, ranked: &[RankedCandidate]) -> String {
        if ranked.is_empty() {
            return "No eligible helpers found.".to_string();
        }
        let rows = ranked
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    (i + 1).to_string(),
                    r.candidate.id.clone(),
                    format!("{:.3}", r.score.total),
                    format!("{:.1}", r.candidate.distance_km),
                    format!("{:.2}", r.candidate.rating_avg),
                    format!("{:.0}", r.candidate.reliability_score),
                    format_money(r.candidate.base_price),
                    r.candidate.is_available.to_string(),
                ]
            })
            .collect();
        Self::table(
            &[
                "#",
                "Helper",
                "Score",
                "Km",
                "Rating",
                "Reliability",
                "Price",
                "Available",
            ],
            rows,
        )
    }

    fn format_earnings(&self, helper_id: &str, summary: &EarningsSummary) -> String {
        let rows = vec![
            vec![
                "Last 7 days".to_string(),
                format_money(summary.week),
                format_money(summary.week_net),
            ],
            vec![
                "Last month".to_string(),
                format_money(summary.month),
                format_money(summary.month_net),
            ],
            vec![
                "All time".to_string(),
                format_money(summary.total),
                format_money(summary.total_net),
            ],
        ];
        format!(
            "Earnings for {} ({} paid jobs, {}% commission)\n{}",
            helper_id,
            summary.total_jobs,
            summary.commission_percent,
            Self::table(&["Window", "Gross", "Net"], rows)
        )
    }

    fn format_dispute(&self, dispute: &Dispute) -> String {
        let mut output = String::new();
        output.push_str(&format!("ID:        {}\n", dispute.id));
        output.push_str(&format!("Booking:   {}\n", dispute.booking_id));
        output.push_str(&format!("Status:    {}\n", dispute.status));
        output.push_str(&format!("Raised by: {}\n", dispute.raised_by));
        output.push_str(&format!("Reason:    {}\n", dispute.reason));
        if !dispute.evidence.is_empty() {
            output.push_str(&format!("Evidence:  {}\n", dispute.evidence.join(", ")));
        }
        if let Some(resolved_by) = &dispute.resolved_by {
            output.push_str(&format!("Decided:   {}\n", resolved_by));
        }
        if let Some(note) = &dispute.resolution_note {
            output.push_str(&format!("Note:      {}\n", note));
        }
        output.push_str(&format!("Created:   {}\n", format_timestamp(dispute.created_at)));
        output
    }

    fn format_disputes(&self, disputes: &[Dispute]) -> String {
        if disputes.is_empty() {
            return "No disputes found.".to_string();
        }
        let rows = disputes
            .iter()
            .map(|d| {
                vec![
                    d.id.clone(),
                    d.booking_id.clone(),
                    d.status.to_string(),
                    d.raised_by.clone(),
                    optional(d.resolved_by.as_deref()).to_string(),
                    format_timestamp(d.created_at),
                ]
            })
            .collect();
        Self::table(
            &["ID", "Booking", "Status", "Raised by", "Decided by", "Created"],
            rows,
        )
    }

    fn format_error(&self, error: &anyhow::Error) -> String {
        format!("Error: {}", error)
    }
}

/// Plain text output formatter.
///
/// Formats records as bare whitespace-separated lines.
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_booking(&self, booking: &Booking) -> String {
        format!(
            "{} {} {} {}",
            booking.id,
            booking.status,
            booking.customer_id,
            optional(booking.helper_id())
        )
    }

    fn format_bookings(&self, bookings: &[Booking]) -> String {
        if bookings.is_empty() {
            return "No bookings found.".to_string();
        }
        bookings
            .iter()
            .map(|b| self.format_booking(b))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_timeline(&self, timeline: &BookingTimeline) -> String {
        let mut lines = vec![self.format_booking(&timeline.booking)];
        for event in &timeline.events {
            lines.push(format!(
                "event {} {} {}",
                event.created_at,
                event.kind.action(),
                event.actor_id
            ));
        }
        for message in &timeline.messages {
            lines.push(format!("message {} {}", message.sender_id, message.body));
        }
        for payment in &timeline.payments {
            lines.push(format!("payment {}", self.format_payment(payment)));
        }
        lines.join("\n")
    }

    fn format_decline(&self, receipt: &DeclineReceipt) -> String {
        format!("{} declined {}", receipt.booking_id, receipt.helper_id)
    }

    fn format_message(&self, message: &Message) -> String {
        message.id.clone()
    }

    fn format_review(&self, review: &Review) -> String {
        format!("{} {}", review.id, review.rating)
    }

    fn format_payment(&self, payment: &Payment) -> String {
        format!(
            "{} {} {} {}",
            payment.id,
            payment.status,
            payment.escrow_status,
            format_money(payment.amount)
        )
    }

    fn format_receipt(&self, receipt: &PaymentReceipt) -> String {
        format!(
            "{}\n{}",
            self.format_payment(&receipt.payment),
            self.format_booking(&receipt.booking)
        )
    }

    fn format_reconciliation(&self, outcome: &Reconciliation) -> String {
        match outcome {
            Reconciliation::UnknownReference { provider_ref } => {
                format!("unknown {}", provider_ref)
            }
            Reconciliation::Unchanged { payment } => format!("unchanged {}", payment.id),
            Reconciliation::Updated { payment, .. } => {
                format!("updated {} {}", payment.id, payment.status)
            }
        }
    }

    fn format_helper(&self, helper: &HelperProfile) -> String {
        format!(
            "{} {} {:.2} {}",
            helper.id, helper.reliability_score, helper.rating_avg, helper.is_available
        )
    }

    fn format_ranking(&self, ranked: &[RankedCandidate]) -> String {
        ranked
            .iter()
            .map(|r| format!("{} {:.3}", r.candidate.id, r.score.total))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_earnings(&self, helper_id: &str, summary: &EarningsSummary) -> String {
        format!(
            "{} {} {} {} {}",
            helper_id,
            format_money(summary.week),
            format_money(summary.month),
            format_money(summary.total),
            summary.total_jobs
        )
    }

    fn format_dispute(&self, dispute: &Dispute) -> String {
        format!(
            "{} {} {} {}",
            dispute.id, dispute.booking_id, dispute.status, dispute.raised_by
        )
    }

    fn format_disputes(&self, disputes: &[Dispute]) -> String {
        if disputes.is_empty() {
            return "No disputes found.".to_string();
        }
        disputes
            .iter()
            .map(|d| self.format_dispute(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &anyhow::Error) -> String {
        format!("Error: {}", error)
    }
}

/// Creates the formatter for an output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Plain => Box::new(PlainFormatter),
    }
}
