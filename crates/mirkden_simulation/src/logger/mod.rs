//! Глобальный logger симуляции.
//!
//! Host engine подставляет свой sink (печать в консоль движка, файл, etc.);
//! по умолчанию — stdout. Уровень фильтруется глобально через set_min_level.

use once_cell::sync::Lazy;
use std::sync::Mutex;

// Потокобезопасный глобальный sink (static, Arc не нужен)
static SINK: Lazy<Mutex<Option<Box<dyn LogSink>>>> = Lazy::new(|| Mutex::new(None));
static MIN_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogSink: Send + Sync {
    fn print(&self, level: LogLevel, message: &str);
}

pub fn set_sink(sink: Box<dyn LogSink>) {
    *SINK.lock().unwrap() = Some(sink);
}

pub fn set_min_level(level: LogLevel) {
    *MIN_LEVEL.lock().unwrap() = level;
}

pub fn set_sink_if_needed(sink: Box<dyn LogSink>) {
    let mut guard = SINK.lock().unwrap();
    if guard.is_none() {
        *guard = Some(sink);
    }
}

pub fn log(message: &str) {
    emit(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    emit(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    emit(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    emit(LogLevel::Error, message);
}

fn emit(level: LogLevel, message: &str) {
    if level < *MIN_LEVEL.lock().unwrap() {
        return;
    }
    // Timestamp добавляем здесь, не в sink'е — host sink'и печатают как есть
    if let Some(sink) = SINK.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        sink.print(level, &format!("[{}] {}", timestamp, message));
    }
}

pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn print(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init() {
    set_sink_if_needed(Box::new(StdoutSink));
}
