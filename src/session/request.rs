use crate::models::chat::ChatMessage;

/// Assembles the outbound conversation: the system instructions, then at most
/// `window_size` of the most recent prior messages (oldest first), then the new
/// user turn. `None` keeps every prior message.
pub fn build_request(
    history: &[ChatMessage],
    new_text: &str,
    system_instructions: &str,
    window_size: Option<usize>
) -> Vec<ChatMessage> {
    let start = match window_size {
        Some(window) => history.len().saturating_sub(window),
        None => 0,
    };
    let window = &history[start..];

    let mut messages = Vec::with_capacity(window.len() + 2);
    messages.push(ChatMessage::system(system_instructions));
    messages.extend(window.iter().cloned());
    messages.push(ChatMessage::user(new_text));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn history(len: usize) -> Vec<ChatMessage> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("question {}", i))
                } else {
                    ChatMessage::assistant(format!("answer {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn keeps_only_the_trailing_window_oldest_first() {
        let log = history(7);
        let messages = build_request(&log, "next", "coach", Some(4));

        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "coach");
        let contents: Vec<&str> = messages[1..5].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["answer 3", "question 4", "answer 5", "question 6"]);
        assert_eq!(messages[5].role, Role::User);
        assert_eq!(messages[5].content, "next");
    }

    #[test]
    fn never_exceeds_window_plus_two() {
        for len in 0..12 {
            for window in 0..6 {
                let messages = build_request(&history(len), "q", "s", Some(window));
                assert_eq!(messages.len(), len.min(window) + 2, "len={} window={}", len, window);
            }
        }
    }

    #[test]
    fn unbounded_window_sends_everything() {
        let log = history(9);
        let messages = build_request(&log, "q", "s", None);
        assert_eq!(messages.len(), 11);
        assert_eq!(messages[1], log[0]);
    }

    #[test]
    fn zero_window_sends_only_instructions_and_new_turn() {
        let messages = build_request(&history(3), "q", "s", Some(0));
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
    }
}
