//! The four lesson forms.

use std::time::Duration;

use formcheck::prelude::*;
use formcheck::regex_lite::{self, Regex};
use serde_json::Value;

/// Usernames the simulated backend reports as taken.
pub const TAKEN_USERNAMES: &[&str] = &["admin", "user", "test", "moderator", "system"];

/// Lesson 1: two fields with a custom message each.
pub fn basic() -> Schema {
    formcheck::object()
        .field("name", formcheck::string().min_msg(2, "Name must be at least 2 characters"))
        .field("email", formcheck::string().email_msg("Invalid email address"))
        .into()
}

/// Lesson 2: chained constraints, a checkbox that must be ticked, and a
/// cross-field rule reported at `confirmPassword`.
pub fn advanced() -> Result<Schema, regex_lite::Error> {
    let password = formcheck::string()
        .min_msg(8, "Password must be at least 8 characters")
        .regex_msg(Regex::new("[A-Z]")?, "Password must contain at least one uppercase letter")
        .regex_msg(Regex::new("[a-z]")?, "Password must contain at least one lowercase letter")
        .regex_msg(Regex::new("[0-9]")?, "Password must contain at least one number")
        .regex_msg(
            Regex::new("[^A-Za-z0-9]")?,
            "Password must contain at least one special character",
        );

    let age = formcheck::number()
        .coerce()
        .type_error("Age must be a number")
        .int_msg("Age must be a whole number")
        .positive_msg("Age must be positive")
        .min_msg(18, "You must be at least 18 years old")
        .max_msg(120, "Age must be valid");

    Ok(formcheck::object()
        .field("username", formcheck::string().min_msg(3, "Username must be at least 3 characters"))
        .field("password", password)
        .field("confirmPassword", formcheck::string())
        .field("age", age)
        .field(
            "termsAccepted",
            formcheck::boolean()
                .coerce()
                .accepted("You must accept the terms and conditions"),
        )
        .refine_at(
            "confirmPassword",
            |v| v["password"] == v["confirmPassword"],
            "Passwords don't match",
        ))
}

/// Simulated availability lookup; takes `delay` to answer.
pub async fn is_username_available(username: &str, delay: Duration) -> bool {
    tokio::time::sleep(delay).await;
    let wanted = username.to_lowercase();
    !TAKEN_USERNAMES.contains(&wanted.as_str())
}

/// Lesson 3: an asynchronous availability check on `username`.
pub fn availability(delay: Duration) -> Schema {
    let username = formcheck::string()
        .min_msg(3, "Username must be at least 3 characters")
        .max_msg(20, "Username must be at most 20 characters")
        .refine_async(
            move |v: Value| async move {
                let name = v.as_str().unwrap_or_default();
                is_username_available(name, delay).await
            },
            "This username is already taken",
        );

    formcheck::object()
        .field("username", username)
        .field("email", formcheck::string().email_msg("Invalid email address"))
        .field_optional("bio", formcheck::string().max_msg(200, "Bio must be at most 200 characters"))
        .into()
}

/// Lesson 4: nested groups and repeatable entries. `current_year` bounds
/// graduation years.
pub fn nested(current_year: i32) -> Result<Schema, regex_lite::Error> {
    let personal_info = formcheck::object()
        .field("firstName", formcheck::string().min_msg(1, "First name is required"))
        .field("lastName", formcheck::string().min_msg(1, "Last name is required"))
        .field("email", formcheck::string().email_msg("Invalid email address"));

    let address = formcheck::object()
        .field("street", formcheck::string().min_msg(1, "Street is required"))
        .field("city", formcheck::string().min_msg(1, "City is required"))
        .field("state", formcheck::string().min_msg(1, "State is required"))
        .field(
            "zipCode",
            formcheck::string().regex_msg(Regex::new(r"^\d{5}(-\d{4})?$")?, "Invalid ZIP code format"),
        );

    let education = formcheck::object()
        .field("institution", formcheck::string().min_msg(1, "Institution name is required"))
        .field("degree", formcheck::string().min_msg(1, "Degree is required"))
        .field(
            "graduationYear",
            formcheck::number()
                .coerce()
                .int()
                .min_msg(1900, "Year must be after 1900")
                .max_msg(current_year, "Year cannot be in the future"),
        );

    let skill = formcheck::object()
        .field("name", formcheck::string().min_msg(1, "Skill name is required"))
        .field(
            "level",
            formcheck::enumeration(&["Beginner", "Intermediate", "Advanced", "Expert"])
                .message("Please select a valid skill level"),
        );

    Ok(formcheck::object()
        .field("personalInfo", personal_info)
        .field("address", address)
        .field(
            "education",
            formcheck::array(education).min_len_msg(1, "At least one education entry is required"),
        )
        .field(
            "skills",
            formcheck::array(skill)
                .min_len_msg(1, "At least one skill is required")
                .max_len_msg(3, "Maximum 3 skills allowed"),
        )
        .field_optional(
            "additionalNotes",
            formcheck::string().max_msg(500, "Notes cannot exceed 500 characters"),
        )
        .into())
}
