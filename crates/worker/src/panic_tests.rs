use super::{TaskClass, join_error_panic_message, panic_payload_message, spawn};

#[test]
fn payload_message_reads_str_and_string() {
	let from_str = std::panic::catch_unwind(|| panic!("provider exploded")).unwrap_err();
	assert_eq!(panic_payload_message(from_str.as_ref()).as_deref(), Some("provider exploded"));

	let url = "https://example.org/x";
	let from_string = std::panic::catch_unwind(|| panic!("bad url {url}")).unwrap_err();
	assert_eq!(panic_payload_message(from_string.as_ref()).as_deref(), Some("bad url https://example.org/x"));

	let opaque = std::panic::catch_unwind(|| std::panic::panic_any(17u8)).unwrap_err();
	assert!(panic_payload_message(opaque.as_ref()).is_none());
}

#[tokio::test]
async fn spawned_fetch_panic_is_reported_with_message() {
	let handle = spawn(TaskClass::Background, async { panic!("fetch blew up") });
	let err = handle.await.unwrap_err();
	let msg = join_error_panic_message(err).expect("should be a panic");
	assert!(msg.contains("fetch blew up"), "got: {msg}");
}

#[tokio::test]
async fn aborted_task_is_not_a_panic() {
	let handle = spawn(TaskClass::Background, async {
		tokio::time::sleep(std::time::Duration::from_secs(60)).await;
	});
	handle.abort();
	let err = handle.await.unwrap_err();
	assert!(join_error_panic_message(err).is_none());
}
