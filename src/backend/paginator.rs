//! Découpage des listes de posts en pages.
//!
//! Un numéro de page invalide renvoie la première page, un numéro trop
//! grand la dernière.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: usize,
    pub next_page_number: usize,
}

/// Sélectionne la page `requested` (texte brut de `?page=`) parmi `items`
pub fn paginate<T>(items: Vec<T>, requested: Option<&str>, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let num_pages = items.len().div_ceil(per_page).max(1);

    let number = match requested.and_then(|raw| raw.trim().parse::<usize>().ok()) {
        Some(0) | None => 1,
        Some(n) => n.min(num_pages),
    };

    let items: Vec<T> = items
        .into_iter()
        .skip((number - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        number,
        num_pages,
        has_previous: number > 1,
        has_next: number < num_pages,
        previous_page_number: number.saturating_sub(1),
        next_page_number: number + 1,
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}
