//! Profile pages of both consoles
//!
//! The picture is a reference (file name or link) shown as a preview with
//! the initials as fallback.

use crate::{page_response, parse_form, require_session, with_toast, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use cashora_core::{AdminProfile, AdminProfileDraft, Notice, Role, UserProfile};
use cashora_utils::escape_html;

fn avatar_preview(avatar: &str, initials: &str, alt: &str) -> String {
    format!(
        "<div class='relative w-20 h-20 rounded-full bg-indigo-100 flex items-center justify-center overflow-hidden'><span class='text-xl font-semibold text-indigo-700'>{}</span><img src='{}' alt='{}' class='absolute inset-0 w-full h-full object-cover' onerror=\"this.remove()\"></div>",
        escape_html(initials),
        escape_html(avatar),
        escape_html(alt)
    )
}

fn read_only(label: &str, value: &str) -> String {
    format!(
        "<div><p class='block text-sm text-gray-600 mb-1'>{}</p><p class='w-full px-3 py-2 border rounded-lg bg-gray-100'>{}</p></div>",
        label,
        escape_html(value)
    )
}

// ==================== User ====================

fn user_avatar(profile: &UserProfile) -> String {
    format!(
        r#"<div id='profile-avatar' class='flex items-center gap-4'>
            {}
            <form class='flex-1' hx-post='/dashboard/profile' hx-target='#profile-avatar' hx-swap='outerHTML'>
                <label class='block text-sm text-gray-600 mb-1' for='avatar'>Profile Picture</label>
                <div class='flex gap-2'>
                    <input id='avatar' name='avatar' value='{}' placeholder='Picture file name or link' class='flex-1 px-3 py-2 border rounded-lg'>
                    <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Update</button>
                </div>
            </form>
        </div>"#,
        avatar_preview(&profile.avatar, &profile.initials(), &profile.full_name()),
        escape_html(&profile.avatar)
    )
}

pub async fn page_user_profile(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let workspace = state.workspace.read().await;
    let profile = &workspace.user_profile;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Profile</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 max-w-2xl space-y-6'>
            <h3 class='text-lg font-semibold'>Your Profile</h3>
            {}
            <div class='grid grid-cols-2 gap-4'>{}{}</div>
            {}{}{}{}{}
        </div>"#,
        user_avatar(profile),
        read_only("First Name", &profile.first_name),
        read_only("Last Name", &profile.last_name),
        read_only("Email", &profile.email),
        read_only("Phone Number", &profile.phone_number),
        read_only("Date of Birth", &profile.date_of_birth.format("%Y-%m-%d").to_string()),
        read_only("Address", &profile.address),
        read_only("Balance", &state.money(workspace.wallet.balance()))
    );

    Ok(Html(page_response(&headers, Role::User, "Profile", "/dashboard/profile", &inner_content)))
}

pub async fn htmx_user_avatar(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::User)?;
    let form = parse_form(&body);
    let avatar = form.get("avatar").map(|s| s.as_str()).unwrap_or("");
    let mut workspace = state.workspace.write().await;
    let notice = workspace.user_profile.set_avatar(avatar).unwrap_or_else(Notice::from);
    Ok(with_toast(user_avatar(&workspace.user_profile), &notice))
}

// ==================== Admin ====================

fn admin_form(profile: &AdminProfile) -> String {
    format!(
        r#"<form id='admin-profile' class='space-y-4' hx-post='/admin/profile' hx-swap='outerHTML'>
            <div class='flex items-center gap-4'>
                {}
                <div class='flex-1'><label class='block text-sm text-gray-600 mb-1' for='avatar'>Profile Picture</label><input id='avatar' name='avatar' value='{}' placeholder='Picture file name or link' class='w-full px-3 py-2 border rounded-lg'></div>
            </div>
            <div><label class='block text-sm text-gray-600 mb-1' for='name'>Name</label><input id='name' name='name' value='{}' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm text-gray-600 mb-1' for='email'>Email</label><input id='email' name='email' type='email' value='{}' class='w-full px-3 py-2 border rounded-lg'></div>
            {}
            <div><label class='block text-sm text-gray-600 mb-1' for='bio'>Bio</label><textarea id='bio' name='bio' rows='4' class='w-full px-3 py-2 border rounded-lg'>{}</textarea></div>
            <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save Profile</button>
        </form>"#,
        avatar_preview(&profile.avatar, &profile.initials(), &profile.name),
        escape_html(&profile.avatar),
        escape_html(&profile.name),
        escape_html(&profile.email),
        read_only("Role", &profile.role),
        escape_html(&profile.bio)
    )
}

pub async fn page_admin_profile(state: State<AppState>, headers: HeaderMap) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let workspace = state.workspace.read().await;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Admin Profile</h2><p class='text-sm text-gray-500'>Manage your admin account details</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 max-w-2xl'>
            <h3 class='text-lg font-semibold'>Your Profile</h3>
            <p class='text-sm text-gray-500 mb-4'>Update your personal information and preferences</p>
            {}
        </div>"#,
        admin_form(&workspace.admin_profile)
    );

    Ok(Html(page_response(&headers, Role::Admin, "Profile", "/admin/profile", &inner_content)))
}

pub async fn htmx_admin_profile(state: State<AppState>, headers: HeaderMap, body: String) -> Result<Html<String>, Response> {
    require_session(&state, &headers, Role::Admin)?;
    let form = parse_form(&body);
    let text = |key: &str| form.get(key).cloned().unwrap_or_default();
    let draft = AdminProfileDraft {
        name: text("name"),
        email: text("email"),
        bio: text("bio"),
        avatar: text("avatar"),
    };

    let mut workspace = state.workspace.write().await;
    match workspace.admin_profile.update(draft.clone()) {
        Ok(notice) => Ok(with_toast(admin_form(&workspace.admin_profile), &notice)),
        Err(e) => {
            // keep what was typed
            let typed = AdminProfile {
                name: draft.name,
                email: draft.email,
                bio: draft.bio,
                ..workspace.admin_profile.clone()
            };
            Ok(with_toast(admin_form(&typed), &Notice::from(e)))
        }
    }
}
