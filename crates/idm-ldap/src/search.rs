//! Paginated search.
//!
//! [`PagedSearchIterator`] turns one search request into a lazy sequence of
//! mapped entries, exchanging the paged-results continuation token with the
//! directory transparently. One page is buffered at a time; the next page is
//! fetched only when the buffer runs dry.
//!
//! A cursor serves exactly one search request: it is not restartable and not
//! safe to share. Retry policy belongs to the caller; a fetch failure ends
//! the sequence after yielding the error.

use tracing::debug;

use crate::connection::{DirectoryConnection, SearchRequest};
use crate::entry::Entry;
use crate::error::LdapDaoResult;

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: i32 = 100;

/// Lazy iterator over the entries matching one search request, each passed
/// through the supplied mapping.
pub struct PagedSearchIterator<'a, C, T, F>
where
    C: DirectoryConnection,
    F: FnMut(Entry) -> T,
{
    conn: &'a mut C,
    request: SearchRequest,
    page_size: i32,
    map: F,
    cookie: Option<Vec<u8>>,
    more_pages: bool,
    page: std::vec::IntoIter<Entry>,
}

impl<'a, C, T, F> PagedSearchIterator<'a, C, T, F>
where
    C: DirectoryConnection,
    F: FnMut(Entry) -> T,
{
    /// Creates a cursor with the default page size.
    ///
    /// ## Panics
    ///
    /// Panics when the connection is not open; handing a closed connection to
    /// a cursor is a programming error, not a search failure.
    pub fn new(conn: &'a mut C, request: SearchRequest, map: F) -> Self {
        Self::with_page_size(conn, request, DEFAULT_PAGE_SIZE, map)
    }

    /// Creates a cursor fetching `page_size` entries per round trip.
    ///
    /// ## Panics
    ///
    /// Panics when the connection is not open.
    pub fn with_page_size(conn: &'a mut C, request: SearchRequest, page_size: i32, map: F) -> Self {
        assert!(
            conn.is_open(),
            "provided connection needs to already be open"
        );
        Self {
            conn,
            request,
            page_size,
            map,
            cookie: None,
            more_pages: true,
            page: Vec::new().into_iter(),
        }
    }

    /// Fetches the next page into the buffer, updating the continuation
    /// token. Short-circuits once the directory reported the last page.
    fn load_next_page(&mut self) -> LdapDaoResult<()> {
        if !self.more_pages {
            self.page = Vec::new().into_iter();
            return Ok(());
        }

        let cookie = self.cookie.take();
        let page = self
            .conn
            .search_page(&self.request, self.page_size, cookie.as_deref())?;

        // an empty or absent token marks this page as the last
        self.cookie = page.cookie.filter(|cookie| !cookie.is_empty());
        self.more_pages = self.cookie.is_some();
        debug!(
            entries = page.entries.len(),
            more_pages = self.more_pages,
            "fetched search result page"
        );

        self.page = page.entries.into_iter();
        Ok(())
    }
}

impl<C, T, F> Iterator for PagedSearchIterator<'_, C, T, F>
where
    C: DirectoryConnection,
    F: FnMut(Entry) -> T,
{
    type Item = LdapDaoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.as_slice().is_empty() {
            if let Err(err) = self.load_next_page() {
                // a failed fetch ends the sequence; the caller owns retries
                self.more_pages = false;
                return Some(Err(err));
            }
        }

        self.page.next().map(|entry| Ok((self.map)(entry)))
    }
}
