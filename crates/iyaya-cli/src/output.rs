use colored::Colorize;
use iyaya_core::{
    Application, Booking, BookingPage, Caregiver, CaregiverPage, Conversation, JobPage, Message,
    Notification,
};
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize>(value: &T) {
    let value = serde_json::to_value(value).unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
}

fn opt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn yes_no(value: Option<bool>) -> String {
    if value == Some(true) { "yes" } else { "no" }.to_string()
}

pub fn print_jobs(page: &JobPage, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Table => {
            if page.jobs.is_empty() {
                println!("No jobs found.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Title", "Location", "Rate", "Status"]);
            for job in &page.jobs {
                builder.push_record([
                    job.id.clone(),
                    job.title.clone(),
                    opt_str(&job.location),
                    opt_num(job.hourly_rate),
                    opt_str(&job.status),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", page.total);
        }
    }
}

pub fn print_bookings(page: &BookingPage, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Table => {
            if page.bookings.is_empty() {
                println!("No bookings found.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Date", "Start", "End", "Status", "Cost"]);
            for booking in &page.bookings {
                builder.push_record([
                    booking.id.clone(),
                    opt_str(&booking.date),
                    opt_str(&booking.start_time),
                    opt_str(&booking.end_time),
                    opt_str(&booking.status),
                    opt_num(booking.total_cost),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", page.total);
        }
    }
}

pub fn print_booking(booking: &Booking, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(booking),
        OutputFormat::Table => {
            println!(
                "{} {} ({})",
                "Booking:".cyan(),
                booking.id.cyan(),
                opt_str(&booking.status)
            );
            print_json(booking);
        }
    }
}

pub fn print_caregivers(page: &CaregiverPage, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Table => {
            if page.caregivers.is_empty() {
                println!("No caregivers found.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Name", "Rate", "Rating", "Verified"]);
            for caregiver in &page.caregivers {
                builder.push_record([
                    caregiver.id.clone(),
                    caregiver.name.clone(),
                    opt_num(caregiver.hourly_rate),
                    opt_num(caregiver.rating),
                    yes_no(caregiver.verified),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
            println!("Total: {}", page.total);
        }
    }
}

pub fn print_caregiver(caregiver: &Caregiver, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(caregiver),
        OutputFormat::Table => {
            println!("{} {}", "Caregiver:".cyan(), caregiver.name.cyan());
            print_json(caregiver);
        }
    }
}

pub fn print_applications(applications: &[Application], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&applications),
        OutputFormat::Table => {
            if applications.is_empty() {
                println!("No applications found.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Job", "Status", "Submitted"]);
            for application in applications {
                builder.push_record([
                    application.id.clone(),
                    application.job_id.clone(),
                    opt_str(&application.status),
                    opt_str(&application.created_at),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_conversations(conversations: &[Conversation], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&conversations),
        OutputFormat::Table => {
            if conversations.is_empty() {
                println!("No conversations.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Last message", "Unread"]);
            for conversation in conversations {
                let unread = conversation
                    .unread_count
                    .map_or_else(|| "-".to_string(), |n| n.to_string());
                builder.push_record([
                    conversation.id.clone(),
                    opt_str(&conversation.last_message),
                    unread,
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_messages(messages: &[Message], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&messages),
        OutputFormat::Table => {
            for message in messages {
                print_message_line(message);
            }
        }
    }
}

pub fn print_message_line(message: &Message) {
    let when = message.created_at.as_deref().unwrap_or("-");
    let who = message.sender_id.as_deref().unwrap_or("?");
    println!("[{}] {}: {}", when.dimmed(), who.cyan(), message.text);
}

pub fn print_notifications(notifications: &[Notification], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&notifications),
        OutputFormat::Table => {
            if notifications.is_empty() {
                println!("No notifications.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Title", "Read", "When"]);
            for notification in notifications {
                builder.push_record([
                    notification.id.clone(),
                    notification.title.clone(),
                    yes_no(notification.read),
                    opt_str(&notification.created_at),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}
