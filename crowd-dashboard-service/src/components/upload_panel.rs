/// Header carrying the percent-encoded name of the uploaded file on `POST /upload`.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Upload control. The script mirrors the server's MIME rule so a bad pick is
/// refused before any bytes leave the browser, and shows the plain-text body
/// of a 413/415 rejection in the error line.
pub fn render(max_upload_bytes: u64) -> String {
    let max_mb = max_upload_bytes / (1024 * 1024);

    format!(
        "<section class=\"panel upload\"><h2>Upload Crowd Video for Analysis</h2>\
         <p>Drag and drop your video file here, or click to browse</p>\
         <p class=\"muted\">Supports MP4, MOV, AVI formats &middot; Max file size: {max_mb}MB</p>\
         <input type=\"file\" id=\"video-file\" accept=\"video/*\">\
         <div id=\"selected\" hidden><strong id=\"file-name\"></strong> \
         <span id=\"file-size\"></span> \
         <button type=\"button\" id=\"start\">Start Analysis</button></div>\
         <p class=\"error\" id=\"upload-error\"></p>\
         <script>{SCRIPT}</script></section>"
    )
}

const SCRIPT: &str = r#"
(function () {
  var input = document.getElementById('video-file');
  var selected = document.getElementById('selected');
  var start = document.getElementById('start');
  var errorBox = document.getElementById('upload-error');
  var file = null;
  input.addEventListener('change', function () {
    var picked = input.files && input.files[0];
    if (picked && picked.type.indexOf('video/') === 0) {
      file = picked;
      document.getElementById('file-name').textContent = picked.name;
      document.getElementById('file-size').textContent =
        (picked.size / (1024 * 1024)).toFixed(1) + ' MB';
      selected.hidden = false;
    } else {
      file = null;
      selected.hidden = true;
      alert('Please select a valid video file.');
    }
  });
  start.addEventListener('click', function () {
    if (!file) return;
    start.disabled = true;
    start.textContent = 'Analyzing...';
    fetch('/upload', {
      method: 'POST',
      headers: { 'Content-Type': file.type, 'X-File-Name': encodeURIComponent(file.name) },
      body: file
    }).then(function (res) {
      if (res.ok) {
        window.location.href = '/dashboard';
        return;
      }
      return res.text().then(function (msg) {
        errorBox.textContent = msg;
        start.disabled = false;
        start.textContent = 'Start Analysis';
      });
    });
  });
})();
"#;
