//! 表单模型与本地校验
//!
//! 每个表单是一个普通结构体，`validate()` 返回第一个未通过的检查。
//! 界面层负责把输入框绑定到字段上。

use crate::MIN_PASSWORD_LEN;
use crate::models::{ManagedUserPatch, NewManagedUser, Role, UserStatus};
use crate::protocol::{LoginRequest, SignupRequestBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Terms,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormIssue {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(FormIssue),
}

impl Validation {
    fn fail(field: Field, message: &'static str) -> Self {
        Validation::Invalid(FormIssue { field, message })
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(issue) => Some(issue.message),
        }
    }
}

pub const MSG_NAME_REQUIRED: &str = "Name is required";
pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_PASSWORD_REQUIRED: &str = "Password is required";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_ACCEPT_TERMS: &str = "Please accept the terms and conditions";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// 依次执行检查，返回第一个失败项
macro_rules! first_issue {
    ($(($cond:expr, $field:expr, $msg:expr)),+ $(,)?) => {{
        $(
            if $cond {
                return Validation::fail($field, $msg);
            }
        )+
        Validation::Valid
    }};
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

// =========================================================
// 认证表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Validation {
        first_issue!(
            (blank(&self.email), Field::Email, MSG_EMAIL_REQUIRED),
            (self.password.is_empty(), Field::Password, MSG_PASSWORD_REQUIRED),
        )
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl SignupForm {
    pub fn validate(&self) -> Validation {
        first_issue!(
            (blank(&self.name), Field::Name, MSG_NAME_REQUIRED),
            (blank(&self.email), Field::Email, MSG_EMAIL_REQUIRED),
            (self.password.is_empty(), Field::Password, MSG_PASSWORD_REQUIRED),
            (
                self.password != self.confirm_password,
                Field::ConfirmPassword,
                MSG_PASSWORD_MISMATCH
            ),
            (!self.accept_terms, Field::Terms, MSG_ACCEPT_TERMS),
        )
    }

    pub fn to_request(&self) -> SignupRequestBody {
        SignupRequestBody {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Google 账号的设置/验证密码表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GooglePasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl GooglePasswordForm {
    pub fn validate(&self) -> Validation {
        first_issue!(
            (
                self.password != self.confirm_password,
                Field::ConfirmPassword,
                MSG_PASSWORD_MISMATCH
            ),
            (
                self.password.chars().count() < MIN_PASSWORD_LEN,
                Field::Password,
                MSG_PASSWORD_TOO_SHORT
            ),
        )
    }
}

// =========================================================
// 用户管理表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddUserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl AddUserForm {
    pub fn validate(&self) -> Validation {
        first_issue!(
            (blank(&self.name), Field::Name, MSG_NAME_REQUIRED),
            (blank(&self.email), Field::Email, MSG_EMAIL_REQUIRED),
            (self.password.is_empty(), Field::Password, MSG_PASSWORD_REQUIRED),
        )
    }

    pub fn to_new_user(&self) -> NewManagedUser {
        NewManagedUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            status: UserStatus::Active,
            company: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditUserForm {
    pub name: String,
    pub email: String,
    /// 留空表示保持原密码
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
}

impl EditUserForm {
    pub fn from_user(user: &crate::models::ManagedUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
            role: user.role,
            status: user.status,
        }
    }

    pub fn validate(&self) -> Validation {
        first_issue!(
            (blank(&self.name), Field::Name, MSG_NAME_REQUIRED),
            (blank(&self.email), Field::Email, MSG_EMAIL_REQUIRED),
        )
    }

    pub fn to_patch(&self) -> ManagedUserPatch {
        ManagedUserPatch {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            role: Some(self.role),
            status: Some(self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            name: "Jane".into(),
            email: "jane@test.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            accept_terms: true,
        }
    }

    #[test]
    fn signup_checks_match_before_terms() {
        let form = SignupForm {
            confirm_password: "other".into(),
            accept_terms: false,
            ..signup()
        };
        assert_eq!(form.validate().message(), Some(MSG_PASSWORD_MISMATCH));

        let form = SignupForm {
            accept_terms: false,
            ..signup()
        };
        assert_eq!(form.validate().message(), Some(MSG_ACCEPT_TERMS));
        assert!(signup().validate().is_valid());
    }

    #[test]
    fn google_password_rules() {
        let short = GooglePasswordForm {
            password: "abc".into(),
            confirm_password: "abc".into(),
        };
        assert_eq!(short.validate().message(), Some(MSG_PASSWORD_TOO_SHORT));

        let mismatch = GooglePasswordForm {
            password: "abc".into(),
            confirm_password: "abd".into(),
        };
        assert_eq!(mismatch.validate().message(), Some(MSG_PASSWORD_MISMATCH));
    }

    #[test]
    fn edit_form_keeps_password_when_blank() {
        let form = EditUserForm {
            name: "John".into(),
            email: "john@test.com".into(),
            ..EditUserForm::default()
        };
        assert_eq!(form.to_patch().password, None);

        let form = EditUserForm {
            password: "newpass".into(),
            ..form
        };
        assert_eq!(form.to_patch().password.as_deref(), Some("newpass"));
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            email: "  ".into(),
            password: "x".into(),
        };
        assert_eq!(
            form.validate(),
            Validation::Invalid(FormIssue {
                field: Field::Email,
                message: MSG_EMAIL_REQUIRED
            })
        );
    }
}
