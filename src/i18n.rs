//! User-facing message catalog.
//!
//! Only strings shown directly to visitors live here; log lines and
//! machine-readable error codes stay in English.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    LoginRequired,
    UserNotFound,
    MessageSent,
    MessageSaveFailed,
    InvalidCredentials,
    PasswordTooShort,
    PasswordMismatch,
    EmailTaken,
    CommentLoginRequired,
    CommentEmpty,
    AdminRequired,
}

impl Locale {
    pub fn text(self, message: Message) -> &'static str {
        match self {
            Locale::En => english(message),
            Locale::Ko => korean(message),
        }
    }
}

fn english(message: Message) -> &'static str {
    match message {
        Message::LoginRequired => "You need to sign in first.",
        Message::UserNotFound => "We could not find your account.",
        Message::MessageSent => "Your message has been sent. I will get back to you soon.",
        Message::MessageSaveFailed => "Something went wrong while saving your message.",
        Message::InvalidCredentials => "Invalid email or password.",
        Message::PasswordTooShort => "Password is too short.",
        Message::PasswordMismatch => "Passwords do not match.",
        Message::EmailTaken => "An account with this email already exists.",
        Message::CommentLoginRequired => "Sign in to leave a comment.",
        Message::CommentEmpty => "Comment cannot be empty.",
        Message::AdminRequired => "Administrator access is required.",
    }
}

fn korean(message: Message) -> &'static str {
    match message {
        Message::LoginRequired => "로그인이 필요합니다.",
        Message::UserNotFound => "사용자 정보를 찾을 수 없습니다.",
        Message::MessageSent => "메시지가 성공적으로 전송되었습니다. 빠른 시일 내에 답변드리겠습니다.",
        Message::MessageSaveFailed => "메시지 저장 중 오류가 발생했습니다.",
        Message::InvalidCredentials => "이메일 또는 비밀번호가 올바르지 않습니다.",
        Message::PasswordTooShort => "비밀번호가 너무 짧습니다.",
        Message::PasswordMismatch => "비밀번호가 일치하지 않습니다.",
        Message::EmailTaken => "이미 가입된 이메일입니다.",
        Message::CommentLoginRequired => "댓글을 작성하려면 로그인이 필요합니다.",
        Message::CommentEmpty => "댓글 내용을 입력하세요.",
        Message::AdminRequired => "관리자 권한이 필요합니다.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_is_english() {
        assert_eq!(Locale::default(), Locale::En);
        assert_eq!(
            Locale::default().text(Message::LoginRequired),
            "You need to sign in first."
        );
    }

    #[test]
    fn test_korean_catalog() {
        assert_eq!(Locale::Ko.text(Message::LoginRequired), "로그인이 필요합니다.");
        assert_ne!(
            Locale::Ko.text(Message::MessageSent),
            Locale::En.text(Message::MessageSent)
        );
    }
}
