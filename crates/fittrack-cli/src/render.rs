// Plain-text rendering of cached records
use fittrack_api::{DayExercise, Exercise, Program, ProgramDay, Quote, UserProgramProgress, Workout};
use fittrack_core::units::{format_weight, WeightUnit};

pub fn program(program: &Program) -> String {
    let mut out = format!("{} [{}]\n", program.program_name, program.program_id);
    if !program.description.is_empty() {
        out.push_str(&format!("  {}\n", program.description));
    }
    out.push_str(&format!(
        "  Level: {}  Goal: {}  {} weeks, {} days ({})\n",
        or_dash(&program.level),
        or_dash(&program.goal),
        program.weeks,
        program.days,
        or_dash(&program.frequency)
    ));
    if !program.equipment.is_empty() {
        out.push_str(&format!("  Equipment: {}\n", program.equipment.join(", ")));
    }
    for item in &program.calendar_overview {
        out.push_str(&format!("  - {}: {}\n", item.title, item.description));
    }
    out
}

pub fn program_line(program: &Program) -> String {
    format!(
        "{:<12} {:<32} {:<12} {} weeks",
        program.program_id,
        program.program_name,
        or_dash(&program.level),
        program.weeks
    )
}

pub fn day(day: &ProgramDay, unit: WeightUnit) -> String {
    let mut out = format!("{} / {}: {}\n", day.program_id, day.day_id, day.day_title);
    if day.rest_day {
        out.push_str("  Rest day\n");
        return out;
    }
    if let Some(minutes) = day.time {
        out.push_str(&format!("  ~{} min\n", minutes));
    }
    for exercise in &day.exercises {
        out.push_str(&format!("  {}\n", prescription(exercise, unit)));
    }
    out
}

pub fn workout(workout: &Workout, unit: WeightUnit) -> String {
    let mut out = format!("{} [{}]\n", workout.workout_name, workout.workout_id);
    if let Some(minutes) = workout.duration {
        out.push_str(&format!("  {} min\n", minutes));
    }
    for exercise in &workout.exercises {
        out.push_str(&format!("  {}\n", prescription(exercise, unit)));
    }
    out
}

pub fn exercise(exercise: &Exercise) -> String {
    let mut out = format!("{} [{}]\n", exercise.exercise_name, exercise.exercise_id);
    if !exercise.muscle_groups.primary.is_empty() {
        out.push_str(&format!(
            "  Primary: {}\n",
            exercise.muscle_groups.primary.join(", ")
        ));
    }
    if !exercise.muscle_groups.secondary.is_empty() {
        out.push_str(&format!(
            "  Secondary: {}\n",
            exercise.muscle_groups.secondary.join(", ")
        ));
    }
    for (i, step) in exercise.instructions.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    out
}

pub fn quote(quote: &Quote) -> String {
    match &quote.author {
        Some(author) => format!("\"{}\" - {}", quote.quote_text, author),
        None => format!("\"{}\"", quote.quote_text),
    }
}

pub fn progress(progress: &UserProgramProgress) -> String {
    let mut out = format!(
        "{} in {}: day {} ({:?})",
        progress.user_id, progress.program_id, progress.current_day, progress.status
    );
    if let Some(last) = progress.last_activity_date {
        out.push_str(&format!(", last active {}", last.format("%Y-%m-%d")));
    }
    out
}

fn prescription(exercise: &DayExercise, unit: WeightUnit) -> String {
    let mut line = format!("{}: {} x {}", exercise.exercise_id, exercise.sets, exercise.reps);
    if let Some(kg) = exercise.weight {
        line.push_str(&format!(" @ {}", format_weight(kg, unit)));
    }
    if let Some(rest) = exercise.rest {
        line.push_str(&format!(", rest {}s", rest));
    }
    line
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
