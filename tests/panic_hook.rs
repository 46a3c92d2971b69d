use serde_json::Value;
use slack_notifier::{install_panic_hook, Notifier, NotifierConfig, Transport, PANIC_SUMMARY};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingTransport {
    texts: Mutex<Vec<String>>,
}

impl Transport for &'static RecordingTransport {
    fn post(&self, _webhook_url: &str, body: &Value) -> slack_notifier::Result<String> {
        let text = body["text"].as_str().unwrap_or_default().to_string();
        self.texts.lock().unwrap().push(text);
        Ok("ok".to_string())
    }
}

#[test]
fn test_panic_sends_error_notification() {
    let transport: &'static RecordingTransport = Box::leak(Box::new(RecordingTransport::default()));
    let notifier = Notifier::with_transport(
        NotifierConfig::new("https://hooks.example.com/T/B/X").unwrap(),
        transport,
    );

    install_panic_hook(Arc::new(notifier));
    let result = std::panic::catch_unwind(|| panic!("disk full"));
    let worker = std::thread::spawn(|| panic!("worker lost its lease")).join();
    let _ = std::panic::take_hook();

    assert!(result.is_err());
    assert!(worker.is_err());

    let texts = transport.texts.lock().unwrap();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains(PANIC_SUMMARY));
    assert!(texts[0].contains("*Exception*: `panic`"));
    assert!(texts[0].contains("disk full at "));
    assert!(texts[0].contains("panic_hook.rs"));
    assert!(texts[1].contains("worker lost its lease at "));
}
